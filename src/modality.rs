use crate::accession::{is_clinical_modality, modality_in_accession};
use regex::Regex;
use std::sync::OnceLock;

/// Pick the most useful modality code for a study.
///
/// 1. the Modality tag, when it is one of the clinical codes
/// 2. a clinical code embedded in the accession number
/// 3. a keyword in the study description
/// 4. whatever the Modality tag said
pub fn resolve_modality(tag: &str, accession: &str, study_description: &str) -> String {
    if is_clinical_modality(tag) {
        return tag.to_string();
    }
    modality_in_accession(accession)
        .or_else(|| modality_from_description(study_description))
        .map(str::to_string)
        .unwrap_or_else(|| tag.to_string())
}

fn modality_from_description(description: &str) -> Option<&'static str> {
    if description.is_empty() || description == "N/A" {
        return None;
    }
    let desc = description.to_uppercase();
    let has = |needle: &str| desc.contains(needle);
    let has_word = |re: &OnceLock<Regex>, word: &str| {
        re.get_or_init(|| Regex::new(&format!(r"\b{word}\b")).unwrap())
            .is_match(&desc)
    };
    if has("PET") || has("FDG") {
        Some("PT")
    } else if has_word(&WORD_CT, "CT") {
        Some("CT")
    } else if has("MRI") || has_word(&WORD_MR, "MR") {
        Some("MR")
    } else if has("ULTRASOUND") || has_word(&WORD_US, "US") {
        Some("US")
    } else if has("X-RAY") || has("XRAY") || has("RADIOGRAPH") {
        Some("DX")
    } else if has("MAMMO") {
        Some("MG")
    } else if has("NUCLEAR") || has("SPECT") {
        Some("NM")
    } else if has("FLUORO") || has("ANGIO") {
        Some("XA")
    } else {
        None
    }
}

static WORD_CT: OnceLock<Regex> = OnceLock::new();
static WORD_MR: OnceLock<Regex> = OnceLock::new();
static WORD_US: OnceLock<Regex> = OnceLock::new();

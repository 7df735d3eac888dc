//! Accession number normalization and patient name comparison.
//!
//! A single study may be split by the ordering system into several accessions
//! (`RAD-12345-CT_1`, `RAD-12345-CT_2`, ...). Matching is always done on the
//! *core* accession, which ends at the modality code.

use crate::types::Accession;
use regex::Regex;
use std::sync::OnceLock;

/// Modality codes which are useful for demographic display. Other valid DICOM
/// modalities (SR, PR, REG, ...) are treated as non-clinical.
pub const CLINICAL_MODALITIES: [&str; 9] = ["CT", "MR", "US", "DX", "CR", "MG", "PT", "NM", "XA"];

/// Placeholder written by some systems when a study has no accession.
const NULL_PLACEHOLDER: &str = "N/A";

static CORE_RE: OnceLock<Regex> = OnceLock::new();
static SPLIT_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
static EMBEDDED_MODALITY_RE: OnceLock<Regex> = OnceLock::new();

fn modality_alternation() -> String {
    CLINICAL_MODALITIES.join("|")
}

/// Normalize an accession to its core form.
///
/// - empty or `"N/A"` becomes the empty accession
/// - `<prefix>-<modality>...` is cut right after the modality code
/// - otherwise trailing `_<digits>` split suffixes are removed
pub fn normalize(raw: &str) -> Accession {
    if raw.is_empty() || raw == NULL_PLACEHOLDER {
        return Accession::from_static("");
    }
    let core_re = CORE_RE.get_or_init(|| {
        Regex::new(&format!(r"^.+-(?:{})", modality_alternation())).unwrap()
    });
    if let Some(m) = core_re.find(raw) {
        return Accession::from(m.as_str());
    }
    let suffix_re = SPLIT_SUFFIX_RE.get_or_init(|| Regex::new(r"(?:_\d+)+$").unwrap());
    let stripped = suffix_re.replace(raw, "");
    if stripped == NULL_PLACEHOLDER {
        Accession::from_static("")
    } else {
        Accession::from(stripped.as_ref())
    }
}

/// Find a clinical modality code embedded in an accession as `-<code>`, followed by
/// the end of the string or a `_`/`-` separator.
pub fn modality_in_accession(accession: &str) -> Option<&'static str> {
    let re = EMBEDDED_MODALITY_RE.get_or_init(|| {
        Regex::new(&format!(r"-({})(?:[_-]|$)", modality_alternation())).unwrap()
    });
    let code = re.captures(accession)?.get(1)?.as_str();
    CLINICAL_MODALITIES.into_iter().find(|m| *m == code)
}

pub fn is_clinical_modality(code: &str) -> bool {
    CLINICAL_MODALITIES.contains(&code)
}

/// The family name of a DICOM person name, i.e. everything before the first `^`.
pub fn last_name(name: &str) -> &str {
    name.split('^').next().unwrap_or_default().trim()
}

/// Whether a study's patient name is consistent with the label shown in the viewer.
///
/// The viewer's family name must appear (case-insensitively) somewhere in the study's
/// patient name. An empty label always matches.
pub fn names_match(window_label: &str, patient_name: &str) -> bool {
    let window_last = last_name(window_label);
    window_last.is_empty()
        || patient_name
            .to_uppercase()
            .contains(&window_last.to_uppercase())
}

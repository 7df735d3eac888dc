use std::path::Path;

use camino::Utf8Path;
use dicom::dictionary_std::tags;
use dicom::object::{DefaultDicomObject, OpenFileOptions, Tag};
use walkdir::WalkDir;

use crate::error::MetadataError;
use crate::modality::resolve_modality;
use crate::types::{Sex, StudyFields};

/// Files smaller than this are still being transferred, or are not study files at all.
pub const MIN_STUDY_FILE_SIZE: u64 = 1024;

/// Read the demographics of the first usable study file found under `folder`.
///
/// Every file of a study carries the same accession, so one file is enough.
/// Small and unreadable files are skipped. Returns [None] if nothing in the folder
/// could be read.
pub fn extract_from_folder(folder: &Utf8Path) -> Option<StudyFields> {
    WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .find_map(|entry| match read_study_file(entry.path()) {
            Ok(fields) => Some(fields),
            Err(e) => {
                tracing::debug!(
                    path = %entry.path().display(),
                    error = e.to_string(),
                    "skipping file"
                );
                None
            }
        })
}

/// Read the demographics of one DICOM file. Pixel data is never loaded.
pub fn read_study_file<P: AsRef<Path>>(path: P) -> Result<StudyFields, MetadataError> {
    let path = path.as_ref();
    let size = fs_err::metadata(path)?.len();
    if size < MIN_STUDY_FILE_SIZE {
        return Err(MetadataError::TooSmall(size));
    }
    let dcm = OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(path)?;
    Ok(study_fields(&dcm))
}

fn study_fields(dcm: &DefaultDicomObject) -> StudyFields {
    let accession = tts(dcm, tags::ACCESSION_NUMBER);
    let study_description = tts(dcm, tags::STUDY_DESCRIPTION);
    let modality = resolve_modality(
        &tts(dcm, tags::MODALITY),
        &accession,
        &study_description,
    );
    StudyFields {
        patient_name: tts(dcm, tags::PATIENT_NAME),
        sex: Sex::from(tts(dcm, tags::PATIENT_SEX).as_str()),
        age: tts(dcm, tags::PATIENT_AGE),
        accession,
        modality,
        study_description,
    }
}

/// String tag, empty if absent.
fn tts(dcm: &DefaultDicomObject, tag: Tag) -> String {
    tt(dcm, tag).unwrap_or_default()
}

/// Try to get the trimmed string value of a DICOM object.
fn tt(dcm: &DefaultDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|e| e.to_str().ok())
        .map(|s| {
            s.trim_matches(|c: char| c.is_whitespace() || c == '\0')
                .to_string()
        })
}

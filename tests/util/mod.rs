#![allow(dead_code)]

use std::sync::Once;

use camino::{Utf8Path, Utf8PathBuf};
use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::dictionary_std::{tags, uids};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};

static INIT_LOGGING: Once = Once::new();

pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        tracing::subscriber::set_global_default(
            tracing_subscriber::FmtSubscriber::builder()
                .with_max_level(tracing::Level::DEBUG)
                .with_test_writer()
                .finish(),
        )
        .unwrap();
    });
}

/// Demographics of a fake study file.
#[derive(Debug, Clone)]
pub struct TestStudy {
    pub accession: &'static str,
    pub patient_name: &'static str,
    pub sex: &'static str,
    pub age: &'static str,
    pub modality: &'static str,
    pub study_description: &'static str,
}

impl TestStudy {
    pub fn new(accession: &'static str, patient_name: &'static str) -> Self {
        Self {
            accession,
            patient_name,
            sex: "M",
            age: "045Y",
            modality: "CT",
            study_description: "CT CHEST W CONTRAST",
        }
    }
}

/// A temporary directory laid out like the service expects it.
pub struct TestDirs {
    _temp_dir: tempfile::TempDir,
    pub root: Utf8PathBuf,
    pub cache_dir: Utf8PathBuf,
    pub data_dir: Utf8PathBuf,
    pub log_path: Utf8PathBuf,
}

impl TestDirs {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(temp_dir.path()).unwrap().to_path_buf();
        let cache_dir = root.join("cache");
        let data_dir = root.join("data");
        let log_dir = root.join("logs");
        for dir in [&cache_dir, &data_dir, &log_dir] {
            fs_err::create_dir_all(dir).unwrap();
        }
        Self {
            _temp_dir: temp_dir,
            cache_dir,
            data_dir,
            log_path: log_dir.join("dictation.log"),
            root,
        }
    }

    pub fn state_path(&self) -> Utf8PathBuf {
        self.data_dir.join(studylock::STATE_FILE_NAME)
    }

    /// Append a line to the dictation log.
    pub fn dictate(&self, line: &str) {
        use std::io::Write;
        let mut file = fs_err::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .unwrap();
        writeln!(file, "{line}").unwrap();
    }

    /// Create a study folder named `uid` holding one study file.
    pub fn add_study(&self, uid: &str, study: &TestStudy) -> Utf8PathBuf {
        let folder = self.cache_dir.join(uid);
        fs_err::create_dir_all(&folder).unwrap();
        write_study_file(&folder.join("IM000001.dcm"), &format!("{uid}.1"), study);
        // folder modification times must differ for ordering
        std::thread::sleep(std::time::Duration::from_millis(20));
        folder
    }
}

/// Write a DICOM file with the given demographics and a block of fake pixel data.
pub fn write_study_file(path: &Utf8Path, sop_instance_uid: &str, study: &TestStudy) {
    let obj = InMemDicomObject::from_element_iter([
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::CT_IMAGE_STORAGE),
        ),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(sop_instance_uid),
        ),
        DataElement::new(
            tags::ACCESSION_NUMBER,
            VR::SH,
            PrimitiveValue::from(study.accession),
        ),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from(study.modality)),
        DataElement::new(
            tags::STUDY_DESCRIPTION,
            VR::LO,
            PrimitiveValue::from(study.study_description),
        ),
        DataElement::new(
            tags::PATIENT_NAME,
            VR::PN,
            PrimitiveValue::from(study.patient_name),
        ),
        DataElement::new(tags::PATIENT_SEX, VR::CS, PrimitiveValue::from(study.sex)),
        DataElement::new(tags::PATIENT_AGE, VR::AS, PrimitiveValue::from(study.age)),
        DataElement::new(tags::PIXEL_DATA, VR::OB, PrimitiveValue::from(vec![0u8; 2048])),
    ]);
    let meta = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
        .media_storage_sop_instance_uid(sop_instance_uid)
        .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .build()
        .unwrap();
    obj.with_exact_meta(meta).write_to_file(path).unwrap();
}

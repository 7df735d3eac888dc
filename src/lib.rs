mod accession;
mod config;
mod error;
mod event;
mod folder_scan;
mod heartbeat;
mod metadata;
mod modality;
mod monitor;
mod patient_age;
mod recency_cache;
mod run_everything;
mod sanitize;
mod search;
mod settings;
mod state_file;
mod trigger;
mod types;
mod watcher;
mod window;

pub use accession::{
    CLINICAL_MODALITIES, is_clinical_modality, last_name, modality_in_accession, names_match,
    normalize,
};
pub use config::{CONFIG_FILE_VAR, DEFAULT_CONFIG_FILE, build_config, get_config};
pub use error::{HandleLoopError, MetadataError, PublishError};
pub use heartbeat::{Beat, Heartbeat, HostStatus};
pub use metadata::{MIN_STUDY_FILE_SIZE, extract_from_folder, read_study_file};
pub use modality::resolve_modality;
pub use monitor::Monitor;
pub use recency_cache::RecencyCache;
pub use run_everything::{run_everything, run_everything_from_env};
pub use search::{MatchSource, ResetReason, SearchEngine, SearchOutcome, SearchSettings};
pub use settings::{HeartbeatOptions, StudylockOptions};
pub use state_file::{STATE_FILE_NAME, StatePublisher, read_published};
pub use trigger::{LogTrigger, parse_log};
pub use types::{Accession, AccessionRef, PublishedState, Sex, StudyFields};
pub use window::{
    ForegroundWindow, LabelFileWindow, NoWindow, SafetyMonitor, patient_label_from_titles,
};

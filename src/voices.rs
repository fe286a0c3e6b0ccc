use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use log::warn;
use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("voice '{0}' not found")]
    NotFound(String),
    #[error("no Piper voice models (*.onnx) found under {}; install a voice or point PDF2AUDIO_VOICES_DIR at one", .0.display())]
    NoVoices(PathBuf),
}

#[derive(Debug, Clone)]
pub struct VoiceInfo {
    pub id: String,
    pub label: String,
    pub language: Option<String>,
    pub quality: Option<String>,
    pub model_path: PathBuf,
}

/// Sidecar metadata Piper ships next to each model as `<id>.onnx.json`.
#[derive(Debug, Deserialize)]
struct VoiceMetadata {
    #[serde(default)]
    language: Option<LanguageMetadata>,
    #[serde(default)]
    audio: Option<AudioMetadata>,
}

#[derive(Debug, Deserialize)]
struct LanguageMetadata {
    name_native: Option<String>,
    name: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AudioMetadata {
    quality: Option<String>,
}

/// Voice models discovered under a base directory. The scan happens once
/// at construction; [`VoiceLibrary::refresh`] re-walks the directory.
pub struct VoiceLibrary {
    base_dir: PathBuf,
    voices: RwLock<HashMap<String, VoiceInfo>>,
}

impl VoiceLibrary {
    pub fn from_env() -> Self {
        let base_dir = std::env::var_os("PDF2AUDIO_VOICES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets/voices"));
        Self::new(base_dir)
    }

    pub fn new(base_dir: PathBuf) -> Self {
        let library = Self {
            base_dir,
            voices: RwLock::new(HashMap::new()),
        };
        library.refresh();
        library
    }

    pub fn refresh(&self) {
        let mut discovered = HashMap::new();
        if self.base_dir.exists() {
            for entry in WalkDir::new(&self.base_dir)
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("onnx") {
                    continue;
                }
                if let Some(info) = build_voice_info(path) {
                    discovered.insert(info.id.clone(), info);
                }
            }
        }
        *self.voices.write() = discovered;
    }

    /// All discovered voices, sorted by label. The position in this list
    /// is the index shown during voice selection.
    pub fn list(&self) -> Vec<VoiceInfo> {
        let mut voices: Vec<_> = self.voices.read().values().cloned().collect();
        voices.sort_by(|a, b| a.label.cmp(&b.label));
        voices
    }

    pub fn get(&self, id: &str) -> Result<VoiceInfo, VoiceError> {
        self.voices
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| VoiceError::NotFound(id.to_string()))
    }

    /// Resolve the user's choice, falling back to the library default
    /// when no override was given.
    pub fn resolve(&self, choice: Option<&str>) -> Result<VoiceInfo, VoiceError> {
        match choice {
            Some(id) => self.get(id),
            None => self.default_voice(),
        }
    }

    fn default_voice(&self) -> Result<VoiceInfo, VoiceError> {
        if let Ok(id) = std::env::var("PDF2AUDIO_VOICE") {
            if !id.is_empty() {
                return self.get(&id);
            }
        }
        self.list()
            .into_iter()
            .next()
            .ok_or_else(|| VoiceError::NoVoices(self.base_dir.clone()))
    }
}

fn build_voice_info(path: &Path) -> Option<VoiceInfo> {
    let id = path.file_stem()?.to_string_lossy().to_string();
    let metadata = load_metadata(path);

    let language_name = metadata
        .as_ref()
        .and_then(|meta| meta.language.as_ref())
        .and_then(|lang| lang.name_native.as_ref().or(lang.name.as_ref()))
        .cloned();
    let label = match &language_name {
        Some(language) => format!("{language} · {id}"),
        None => id.clone(),
    };

    Some(VoiceInfo {
        id,
        label,
        language: metadata
            .as_ref()
            .and_then(|meta| meta.language.as_ref())
            .and_then(|lang| lang.code.clone()),
        quality: metadata
            .as_ref()
            .and_then(|meta| meta.audio.as_ref())
            .and_then(|audio| audio.quality.clone()),
        model_path: path.to_path_buf(),
    })
}

fn load_metadata(model_path: &Path) -> Option<VoiceMetadata> {
    let mut metadata_path = model_path.to_path_buf();
    metadata_path.set_extension("onnx.json");
    if !metadata_path.exists() {
        return None;
    }
    match fs::read_to_string(&metadata_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                warn!("failed to parse voice metadata {}: {err}", metadata_path.display());
                None
            }
        },
        Err(err) => {
            warn!("failed to read voice metadata {}: {err}", metadata_path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use serial_test::serial;

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn discovers_onnx_models_in_subdirectories() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("es/alba.onnx").touch().unwrap();
        temp.child("en/ryan.onnx").touch().unwrap();
        temp.child("notes.txt").touch().unwrap();

        let library = VoiceLibrary::new(temp.path().to_path_buf());
        let voices = library.list();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].id, "alba");
        assert_eq!(voices[1].id, "ryan");
    }

    #[test]
    fn labels_come_from_sidecar_metadata() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("alba.onnx").touch().unwrap();
        temp.child("alba.onnx.json")
            .write_str(r#"{"language":{"name_native":"Español","code":"es_ES"},"audio":{"quality":"high"}}"#)
            .unwrap();

        let library = VoiceLibrary::new(temp.path().to_path_buf());
        let voice = library.get("alba").unwrap();
        assert_eq!(voice.label, "Español · alba");
        assert_eq!(voice.language.as_deref(), Some("es_ES"));
        assert_eq!(voice.quality.as_deref(), Some("high"));
    }

    #[test]
    fn malformed_metadata_falls_back_to_the_model_stem() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("ryan.onnx").touch().unwrap();
        temp.child("ryan.onnx.json").write_str("not json").unwrap();

        let library = VoiceLibrary::new(temp.path().to_path_buf());
        assert_eq!(library.get("ryan").unwrap().label, "ryan");
    }

    #[test]
    fn unknown_voice_id_is_not_found() {
        let temp = assert_fs::TempDir::new().unwrap();
        let library = VoiceLibrary::new(temp.path().to_path_buf());
        assert!(matches!(library.get("nope"), Err(VoiceError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn resolving_the_default_in_an_empty_library_fails() {
        std::env::remove_var("PDF2AUDIO_VOICE");
        let temp = assert_fs::TempDir::new().unwrap();
        let library = VoiceLibrary::new(temp.path().to_path_buf());
        assert!(matches!(library.resolve(None), Err(VoiceError::NoVoices(_))));
    }

    #[test]
    #[serial]
    fn default_voice_honours_the_environment_override() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("alba.onnx").touch().unwrap();
        temp.child("ryan.onnx").touch().unwrap();

        let library = VoiceLibrary::new(temp.path().to_path_buf());
        let _guard = EnvGuard::set("PDF2AUDIO_VOICE", "ryan");
        assert_eq!(library.resolve(None).unwrap().id, "ryan");
    }

    #[test]
    #[serial]
    fn default_voice_is_the_first_sorted_entry() {
        std::env::remove_var("PDF2AUDIO_VOICE");
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("zulu.onnx").touch().unwrap();
        temp.child("alba.onnx").touch().unwrap();

        let library = VoiceLibrary::new(temp.path().to_path_buf());
        assert_eq!(library.resolve(None).unwrap().id, "alba");
    }

    #[test]
    fn explicit_choice_overrides_the_default() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("alba.onnx").touch().unwrap();
        temp.child("ryan.onnx").touch().unwrap();

        let library = VoiceLibrary::new(temp.path().to_path_buf());
        assert_eq!(library.resolve(Some("ryan")).unwrap().id, "ryan");
    }
}

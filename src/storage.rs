//! Persisted player settings (last-played song, output volume trim), kept
//! the way the source kept its emulator save state: a small JSON blob under
//! the platform's config directory, read once at startup and written back
//! on change.

use directories::ProjectDirs;
use nanoserde::{DeJson, SerJson};
use std::fs::{create_dir_all, read_to_string};
use std::path::Path;
use std::{fs, io};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, SerJson, DeJson)]
pub struct Settings {
    pub last_song_index: usize,
    pub volume_trim: i8,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            last_song_index: 0,
            volume_trim: 0,
        }
    }
}

pub trait Storage {
    fn get_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>) -> Option<T>;
    fn save_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>, to_save: &T) -> io::Result<()>;
    fn get_dirs(&self) -> &ProjectDirs;
}

pub struct FileStorage {
    project_dirs: ProjectDirs,
}

impl FileStorage {
    pub fn new() -> Option<FileStorage> {
        let project_dirs = ProjectDirs::from("", "", "chiptune-player")?;
        create_dir_all(project_dirs.config_dir()).ok()?;
        Some(FileStorage { project_dirs })
    }

    pub fn load_settings(&self) -> Settings {
        self.get_value(SETTINGS_FILE).unwrap_or_default()
    }

    pub fn save_settings(&self, settings: &Settings) -> io::Result<()> {
        self.save_value(SETTINGS_FILE, settings)
    }
}

impl Storage for FileStorage {
    fn get_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>) -> Option<T> {
        let json = read_to_string(self.project_dirs.config_dir().join(file_name)).ok()?;
        T::deserialize_json(json.as_str()).ok()
    }

    fn save_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>, to_save: &T) -> io::Result<()> {
        let json = T::serialize_json(to_save);
        fs::write(self.project_dirs.config_dir().join(file_name), json)
    }

    fn get_dirs(&self) -> &ProjectDirs {
        &self.project_dirs
    }
}

use std::path::PathBuf;

pub fn default_root() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_index() -> String {
    "index.html".to_string()
}

pub fn default_modules_dir() -> PathBuf {
    PathBuf::from("node_modules")
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

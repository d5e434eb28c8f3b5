//! Persisted auth session, so `login`, later commands and `logout` compose
//! across invocations.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use fineforce_store::Session;

const FILE_NAME: &str = "session.json";

/// `$HOME/.fineforce/session.json`, or `./.fineforce/session.json` without a home.
pub fn default_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".fineforce").join(FILE_NAME)
}

pub fn load(path: &Path) -> anyhow::Result<Option<Session>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let session = serde_json::from_str(&text)
        .with_context(|| format!("parsing session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn save(path: &Path, session: &Session) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(session)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn clear(path: &Path) -> anyhow::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineforce_core::User;

    fn session() -> Session {
        Session {
            access_token: "eyJhbGciOi.token".into(),
            refresh_token: Some("r1".into()),
            expires_at: Some(1_800_000_000),
            user: User::from_parts(
                "u-1".into(),
                Some("asha@traffic.gov.in".into()),
                Some("Asha".into()),
                Some("KA-0421".into()),
            ),
        }
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        assert!(load(&path).unwrap().is_none());
        save(&path, &session()).unwrap();
        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.user.officer_id, "KA-0421");
        assert_eq!(loaded.access_token, "eyJhbGciOi.token");

        clear(&path).unwrap();
        assert!(load(&path).unwrap().is_none());
        clear(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing session file"));
    }
}

// ABOUTME: Persists generated keypair material into the project directory.
// ABOUTME: The private key is written owner-readable only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cloud::KeyMaterial;

pub fn private_key_path(dir: &Path, keypair: &str) -> PathBuf {
    dir.join(keypair)
}

pub fn public_key_path(dir: &Path, keypair: &str) -> PathBuf {
    dir.join(format!("{keypair}.pub"))
}

/// Write both halves of `material` under `dir`, returning the private key path.
pub fn persist(dir: &Path, material: &KeyMaterial) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let private = private_key_path(dir, &material.name);
    write_private(&private, material.private_key.as_bytes())?;
    fs::write(public_key_path(dir, &material.name), &material.public_key)?;

    Ok(private)
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    // mode() only applies when the file is created
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> KeyMaterial {
        KeyMaterial {
            name: "demo_ssh".to_string(),
            private_key: "PRIVATE".to_string(),
            public_key: "ssh-rsa PUBLIC".to_string(),
        }
    }

    #[test]
    fn persist_writes_both_halves() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("projects/demo");

        let private = persist(&project_dir, &material()).unwrap();

        assert_eq!(private, project_dir.join("demo_ssh"));
        assert_eq!(fs::read_to_string(&private).unwrap(), "PRIVATE");
        assert_eq!(
            fs::read_to_string(project_dir.join("demo_ssh.pub")).unwrap(),
            "ssh-rsa PUBLIC"
        );
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let private = persist(dir.path(), &material()).unwrap();

        let mode = fs::metadata(private).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ChannelError, Result};
use crate::shutdown::ShutdownFlag;

/// An open rpmsg character device.
///
/// The handle is opened read-write. Reads and writes go through distinct
/// kernel buffers on the rpmsg endpoint, so a cloned handle can serve the
/// send path while the original blocks in the receive loop, with no lock
/// between them.
pub struct RpmsgDevice {
    file: File,
    path: PathBuf,
}

impl RpmsgDevice {
    /// Open the rpmsg device at `path` for read-write.
    ///
    /// An empty path means no device is configured: logged, and `Ok(None)`
    /// is returned. Any other open failure is an error; callers that treat
    /// a missing link as fatal decide process policy themselves.
    pub fn open(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            warn!("no rpmsg device configured");
            return Ok(None);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| ChannelError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        info!(?path, "rpmsg port opened");

        Ok(Some(Self {
            file,
            path: path.to_path_buf(),
        }))
    }

    /// Clone the handle (new file descriptor over the same endpoint).
    ///
    /// Used to run the transmitter from a different thread than the
    /// receive loop.
    pub fn try_clone(&self) -> Result<Self> {
        let file = self.file.try_clone()?;
        Ok(Self {
            file,
            path: self.path.clone(),
        })
    }

    /// The device path this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for RpmsgDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for RpmsgDevice {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl std::fmt::Debug for RpmsgDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpmsgDevice")
            .field("path", &self.path)
            .finish()
    }
}

/// Close the link: trigger the shutdown flag, then release the handle.
///
/// Safe to call with `None` (open returned no device); the flag is still
/// triggered so a receive loop waiting on another clone of it stops.
pub fn close(shutdown: &ShutdownFlag, device: Option<RpmsgDevice>) {
    shutdown.trigger();
    if let Some(device) = device {
        debug!(path = ?device.path(), "rpmsg port closed");
        drop(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};

    fn temp_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rplink-dev-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir.join("endpoint")
    }

    #[test]
    fn empty_path_yields_no_device() {
        let device = RpmsgDevice::open("").expect("empty path should not error");
        assert!(device.is_none());
    }

    #[test]
    fn missing_device_is_an_open_error() {
        let result = RpmsgDevice::open("/nonexistent/rpmsg_ctrl99");
        assert!(matches!(result, Err(ChannelError::Open { .. })));
    }

    #[test]
    fn open_write_read_roundtrip() {
        let path = temp_path("rw");
        std::fs::write(&path, b"").unwrap();

        let mut device = RpmsgDevice::open(&path)
            .expect("open should succeed")
            .expect("path is non-empty");
        device.write_all(b"abc").unwrap();
        device.file.seek(SeekFrom::Start(0)).unwrap();

        let mut back = Vec::new();
        device.read_to_end(&mut back).unwrap();
        assert_eq!(back, b"abc");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn cloned_handle_shares_endpoint() {
        let path = temp_path("clone");
        std::fs::write(&path, b"").unwrap();

        let device = RpmsgDevice::open(&path)
            .expect("open should succeed")
            .expect("path is non-empty");
        let mut writer = device.try_clone().expect("clone should succeed");
        writer.write_all(b"xyz").unwrap();

        let back = std::fs::read(&path).unwrap();
        assert_eq!(back, b"xyz");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn close_with_no_device_still_triggers_flag() {
        let flag = ShutdownFlag::new();
        close(&flag, None);
        assert!(flag.is_triggered());
    }

    #[test]
    fn close_releases_device_and_triggers_flag() {
        let path = temp_path("close");
        std::fs::write(&path, b"").unwrap();

        let device = RpmsgDevice::open(&path)
            .expect("open should succeed")
            .expect("path is non-empty");
        let flag = ShutdownFlag::new();
        close(&flag, Some(device));

        assert!(flag.is_triggered());
        let _ = std::fs::remove_file(&path);
    }
}

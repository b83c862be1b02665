#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

/// A bootable configuration with three services in two inherited runlevels.
pub const SAMPLE: &str = "\
# Global settings
DisableCAD true
EnableLogging true
AlignStatusReports false
DefaultRunlevel default
Hostname testbox
RunlevelInherits default single
DefinePriority Early 1
DefinePriority Services 3

ObjectID mounts
\tObjectDescription Mounting filesystems
\tObjectStartCommand /bin/mount -a
\tObjectStopCommand NONE
\tObjectStartPriority Early
\tObjectStopPriority 0
\tObjectEnabled true
\tObjectRunlevels single

ObjectID sshd
\tObjectDescription=OpenSSH server
\tObjectStartCommand /usr/sbin/sshd
\tObjectStopCommand PIDFILE /run/sshd.pid
\tObjectStartPriority Services
\tObjectStopPriority 1
\tObjectEnabled true
\tObjectOptions SERVICE AUTORESTART
\tObjectRunlevels default

>!>
ObjectID disabled
\tObjectRunlevels nowhere
<!<
ObjectID getty
\tObjectDescription Login prompt
\tObjectStartCommand /sbin/agetty tty1
\tObjectStopCommand PID
\tObjectStartPriority 3
\tObjectStopPriority 2
\tObjectEnabled true
\tObjectRunlevels default single
";

/// Temporary directory holding an `epoch.conf`.
pub struct ConfigDir {
    dir: TempDir,
    path: PathBuf,
}

impl ConfigDir {
    pub fn new(source: &str) -> Self {
        let dir = TempDir::new().expect("failed to create tempdir");
        let path = dir.path().join("epoch.conf");
        fs::write(&path, source).expect("failed to write config");
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn rewrite(&self, source: &str) {
        fs::write(&self.path, source).expect("failed to rewrite config");
    }

    pub fn read(&self) -> String {
        fs::read_to_string(&self.path).expect("failed to read config")
    }
}

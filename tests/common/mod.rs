#![allow(dead_code)]

use native_bridge::Port;
use std::{cell::RefCell, collections::HashMap, env, rc::Rc};
use tempfile::TempDir;
use tokio::time::Instant;

/// Env guard that restores previous env vars on drop.
pub struct EnvGuard {
    old: HashMap<String, Option<String>>,
}

impl EnvGuard {
    pub fn set(vars: &[(&str, String)]) -> Self {
        let mut old = HashMap::new();
        for (k, v) in vars {
            old.insert((*k).to_string(), env::var(k).ok());
            env::set_var(k, v);
        }
        Self { old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, prev) in self.old.drain() {
            match prev {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
    }
}

/// Temp sandbox with HOME/APPDATA pointed into it, so data dirs and manifests
/// never touch the real profile.
pub fn sandbox_env() -> (TempDir, EnvGuard) {
    let td = TempDir::new().expect("tempdir");
    let root = td.path().to_path_buf();

    let home = root.join("home");
    let appdata = root.join("appdata_roaming");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&appdata).unwrap();

    let guard = EnvGuard::set(&[
        ("HOME", home.to_string_lossy().to_string()),
        ("APPDATA", appdata.to_string_lossy().to_string()),
    ]);

    (td, guard)
}

/// One recorded `connect` call: when it happened, which id, and the host's end.
pub struct Dial {
    pub at: Instant,
    pub host_id: String,
    pub peer: Option<Port>,
}

/// Connector that hands back in-memory ports and keeps the far ends so the test
/// can play the native host.
#[derive(Clone, Default)]
pub struct FakeHost {
    pub dials: Rc<RefCell<Vec<Dial>>>,
}

impl FakeHost {
    pub fn connector(&self) -> impl FnMut(&str) -> Port {
        let dials = self.dials.clone();
        move |host_id: &str| {
            let (ours, theirs) = Port::pair(host_id);
            dials.borrow_mut().push(Dial {
                at: Instant::now(),
                host_id: host_id.to_string(),
                peer: Some(theirs),
            });
            ours
        }
    }

    pub fn dial_count(&self) -> usize {
        self.dials.borrow().len()
    }

    /// Take the host's end of the `n`th connection.
    pub fn peer(&self, n: usize) -> Port {
        self.dials.borrow_mut()[n].peer.take().expect("peer already taken")
    }

    /// Simulate the host process going away.
    pub fn kill(&self, n: usize) {
        drop(self.dials.borrow_mut()[n].peer.take());
    }
}

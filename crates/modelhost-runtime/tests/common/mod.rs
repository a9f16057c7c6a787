//! In-memory fakes for the host ports.
//!
//! Each integration test binary pulls this in with `mod common;`, so not
//! every helper is used everywhere.

#![allow(dead_code)]

use async_trait::async_trait;
use modelhost_core::{
    CommandOutput, CommandRunner, ExitReport, LaunchCommand, ManagerSettings, OutputReader,
    PortProbe, ProcessSignaller, ProcessSpawner, ReadinessPolicy, SignalError, SpawnedProcess,
};
use modelhost_runtime::BackendManager;
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Base port for tests; nothing real ever binds it.
pub const TEST_PORT: u16 = 19080;

/// Millisecond-scale settings so lifecycle tests finish quickly.
pub fn fast_settings() -> ManagerSettings {
    ManagerSettings {
        readiness: ReadinessPolicy::new(Duration::from_millis(20), 3),
        grace_period_ms: 5,
        ..ManagerSettings::default()
    }
}

/// Port probe backed by a set of "bound" ports.
#[derive(Default)]
pub struct FakeProbe {
    bound: Mutex<HashSet<u16>>,
    probed: Mutex<Vec<u16>>,
}

impl FakeProbe {
    pub fn bind(&self, port: u16) {
        self.bound.lock().unwrap().insert(port);
    }

    pub fn probed(&self) -> Vec<u16> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortProbe for FakeProbe {
    async fn is_port_in_use(&self, port: u16) -> bool {
        self.probed.lock().unwrap().push(port);
        self.bound.lock().unwrap().contains(&port)
    }
}

/// What the fake process does once spawned.
#[derive(Clone, Default)]
pub struct Script {
    /// Port the "server" binds as soon as it is spawned.
    pub binds: Option<u16>,
    pub stdout: String,
    pub stderr: String,
    /// Exit code reported immediately; `None` keeps the process alive.
    pub exit_code: Option<i32>,
    pub no_pid: bool,
}

/// Spawner that hands out fake pids and scripted output.
pub struct FakeSpawner {
    probe: Arc<FakeProbe>,
    script: Mutex<Script>,
    next_pid: AtomicU32,
    fail_with: Option<io::ErrorKind>,
    spawned: Mutex<Vec<LaunchCommand>>,
    alive: Mutex<HashMap<u32, oneshot::Sender<ExitReport>>>,
}

impl FakeSpawner {
    pub fn new(probe: Arc<FakeProbe>) -> Self {
        Self {
            probe,
            script: Mutex::new(Script::default()),
            next_pid: AtomicU32::new(4242),
            fail_with: None,
            spawned: Mutex::new(Vec::new()),
            alive: Mutex::new(HashMap::new()),
        }
    }

    pub fn failing(probe: Arc<FakeProbe>, kind: io::ErrorKind) -> Self {
        Self {
            fail_with: Some(kind),
            ..Self::new(probe)
        }
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }

    pub fn spawned(&self) -> Vec<LaunchCommand> {
        self.spawned.lock().unwrap().clone()
    }

    /// Make a live fake process exit with `code`.
    pub fn exit(&self, pid: u32, code: i32) {
        if let Some(tx) = self.alive.lock().unwrap().remove(&pid) {
            let _ = tx.send(ExitReport { code: Some(code) });
        }
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, command: &LaunchCommand) -> io::Result<SpawnedProcess> {
        self.spawned.lock().unwrap().push(command.clone());
        if let Some(kind) = self.fail_with {
            return Err(io::Error::new(kind, "program not found"));
        }

        let script = self.script.lock().unwrap().clone();
        if let Some(port) = script.binds {
            self.probe.bind(port);
        }

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        match script.exit_code {
            Some(code) => {
                let _ = tx.send(ExitReport { code: Some(code) });
            }
            None => {
                self.alive.lock().unwrap().insert(pid, tx);
            }
        }

        Ok(SpawnedProcess {
            pid: (!script.no_pid).then_some(pid),
            stdout: Some(reader(script.stdout)),
            stderr: Some(reader(script.stderr)),
            exit: rx,
        })
    }
}

fn reader(text: String) -> OutputReader {
    Box::pin(Cursor::new(text.into_bytes()))
}

/// Signaller that records every call.
pub struct RecordingSignaller {
    terminate_result: Result<(), SignalError>,
    calls: Mutex<Vec<(&'static str, u32)>>,
}

impl RecordingSignaller {
    pub fn new() -> Self {
        Self::returning(Ok(()))
    }

    pub fn returning(terminate_result: Result<(), SignalError>) -> Self {
        Self {
            terminate_result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(&'static str, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessSignaller for RecordingSignaller {
    fn terminate(&self, pid: u32) -> Result<(), SignalError> {
        self.calls.lock().unwrap().push(("terminate", pid));
        self.terminate_result.clone()
    }

    fn kill(&self, pid: u32) -> Result<(), SignalError> {
        self.calls.lock().unwrap().push(("kill", pid));
        Err(SignalError::AlreadyExited)
    }
}

/// Signaller whose SIGTERM makes the fake process exit straight away.
pub struct ObedientSignaller {
    spawner: Arc<FakeSpawner>,
    calls: Mutex<Vec<(&'static str, u32)>>,
}

impl ObedientSignaller {
    pub fn new(spawner: Arc<FakeSpawner>) -> Self {
        Self {
            spawner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(&'static str, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessSignaller for ObedientSignaller {
    fn terminate(&self, pid: u32) -> Result<(), SignalError> {
        self.calls.lock().unwrap().push(("terminate", pid));
        self.spawner.exit(pid, 0);
        Ok(())
    }

    fn kill(&self, pid: u32) -> Result<(), SignalError> {
        self.calls.lock().unwrap().push(("kill", pid));
        Ok(())
    }
}

/// Command runner that records detached launches.
#[derive(Default)]
pub struct RecordingCommands {
    pub fail: bool,
    launched: Mutex<Vec<String>>,
}

impl RecordingCommands {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingCommands {
    async fn run(&self, _command_line: &str) -> io::Result<CommandOutput> {
        Ok(CommandOutput::ok(""))
    }

    async fn launch_detached(&self, command_line: &str) -> io::Result<()> {
        self.launched.lock().unwrap().push(command_line.to_string());
        if self.fail {
            Err(io::Error::new(io::ErrorKind::NotFound, "sh: ollama: not found"))
        } else {
            Ok(())
        }
    }
}

/// A manager wired entirely to fakes, with handles to inspect them.
pub struct Harness {
    pub manager: BackendManager,
    pub probe: Arc<FakeProbe>,
    pub spawner: Arc<FakeSpawner>,
    pub signaller: Arc<RecordingSignaller>,
    pub commands: Arc<RecordingCommands>,
}

impl Harness {
    pub fn new() -> Self {
        let probe = Arc::new(FakeProbe::default());
        let spawner = Arc::new(FakeSpawner::new(Arc::clone(&probe)));
        Self::build(
            probe,
            spawner,
            RecordingSignaller::new(),
            RecordingCommands::default(),
        )
    }

    pub fn build(
        probe: Arc<FakeProbe>,
        spawner: Arc<FakeSpawner>,
        signaller: RecordingSignaller,
        commands: RecordingCommands,
    ) -> Self {
        let signaller = Arc::new(signaller);
        let commands = Arc::new(commands);
        let manager = BackendManager::new(fast_settings())
            .with_port_probe(Arc::clone(&probe) as Arc<dyn PortProbe>)
            .with_spawner(Arc::clone(&spawner) as Arc<dyn ProcessSpawner>)
            .with_signaller(Arc::clone(&signaller) as Arc<dyn ProcessSignaller>)
            .with_command_runner(Arc::clone(&commands) as Arc<dyn CommandRunner>);
        Self {
            manager,
            probe,
            spawner,
            signaller,
            commands,
        }
    }

    /// Script the next spawn to bind `port` immediately.
    pub fn server_binds(&self, port: u16) {
        self.spawner.set_script(Script {
            binds: Some(port),
            ..Script::default()
        });
    }
}

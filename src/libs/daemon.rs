//! Background process management for the watch command.
//!
//! Handles the watcher lifecycle: building the geofence monitor from the
//! configuration, running it until a shutdown signal arrives, and spawning
//! or stopping a detached copy of the executable tracked through a PID file.

use crate::db::flags::FlagStore;
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use crate::libs::location::LocationSource;
use crate::libs::messages::Message;
use crate::libs::monitor::{Activation, GeofenceMonitor};
use crate::libs::notifier::{self, NotifierKind};
use crate::{msg_bail_anyhow, msg_error_anyhow, msg_info, msg_warning};
use anyhow::Result;
use std::io::ErrorKind;
use std::path::PathBuf;
#[cfg(any(unix, windows))]
use std::process::Stdio;
use std::time::Duration;

pub const PID_FILE: &str = "museo-watch.pid";

/// Monitor wired to the configured providers and the on-disk flag store.
pub type WatchMonitor = GeofenceMonitor<LocationSource, NotifierKind, FlagStore>;

pub fn pid_path() -> Result<PathBuf> {
    Ok(DataStorage::new().get_path(PID_FILE)?)
}

/// PID of the running watcher, if the PID file exists and is readable.
pub fn running_pid() -> Result<Option<u32>> {
    let pid_path = pid_path()?;
    if !pid_path.exists() {
        return Ok(None);
    }
    let pid_str = std::fs::read_to_string(&pid_path)?;
    let pid = pid_str.trim().parse().map_err(|_| msg_error_anyhow!(Message::InvalidPidFileContent))?;
    Ok(Some(pid))
}

/// PID of the watcher if the PID file names a process that is still alive.
/// A stale PID file left by a crashed watcher yields `None`.
pub fn active_pid() -> Result<Option<u32>> {
    Ok(running_pid()?.filter(|&pid| is_process_alive(pid)))
}

#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), None) != Err(Errno::ESRCH)
}

#[cfg(windows)]
fn is_process_alive(pid: u32) -> bool {
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::OpenProcess;
    use winapi::um::winnt::PROCESS_QUERY_LIMITED_INFORMATION;

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle.is_null() {
            return false;
        }
        CloseHandle(handle);
        true
    }
}

#[cfg(not(any(unix, windows)))]
fn is_process_alive(_pid: u32) -> bool {
    true
}

/// Builds the watcher from the configuration.
///
/// Also performs the process-wide notification presentation setup, which has
/// to happen before the monitor activates.
pub fn build_monitor(config: &Config) -> Result<WatchMonitor> {
    let geofence = config.geofence_config()?;
    let notifications = config.notifications_config();
    notifier::configure_presentation(notifications.presentation());

    let location = config.location_config().build()?;
    let sink = notifications.build()?;
    let store = FlagStore::new()?;

    Ok(GeofenceMonitor::new(geofence, notifications.welcome(), location, sink, store)?)
}

/// Daemon entry point: runs the watcher, then removes the PID file.
pub async fn run_with_signal_handling() -> Result<()> {
    let result = run_monitor().await;

    // Clean up PID file on exit
    let pid_path = pid_path()?;
    if pid_path.exists() {
        let _ = std::fs::remove_file(&pid_path);
    }

    result
}

/// Runs the watcher in the current process until a shutdown signal arrives.
pub async fn run_monitor() -> Result<()> {
    let config = Config::load()?;
    let mut monitor = build_monitor(&config)?;

    if monitor.activate().await == Activation::LocationDenied {
        return Ok(());
    }

    wait_for_shutdown().await?;
    msg_info!(Message::MonitorShuttingDown);
    monitor.deactivate().await;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => msg_info!(Message::WatcherReceivedSigterm),
        _ = sigint.recv() => msg_info!(Message::WatcherReceivedSigint),
    }
    Ok(())
}

#[cfg(windows)]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    msg_info!(Message::WatcherReceivedCtrlC);
    Ok(())
}

#[cfg(not(any(unix, windows)))]
async fn wait_for_shutdown() -> Result<()> {
    msg_warning!(Message::WatcherSignalHandlingNotSupported);
    std::future::pending::<()>().await;
    Ok(())
}

/// Spawns the application as a detached background process.
/// A watcher that is already running is stopped first.
pub fn spawn() -> Result<()> {
    let pid_path = pid_path()?;

    if let Ok(Some(pid)) = running_pid() {
        msg_info!(Message::WatcherStoppingExisting(pid.to_string()));
        if let Err(e) = stop_internal() {
            msg_warning!(Message::WatcherFailedToStopExisting(e.to_string()));
            let _ = std::fs::remove_file(&pid_path);
        }
        // Give the old process time to clean up
        std::thread::sleep(Duration::from_millis(1000));
    }

    let current_exe = std::env::current_exe()?;

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let mut command = std::process::Command::new(current_exe);
        command
            .args(["watch", "--daemon-run"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                // Detach from the current session to become a daemon.
                nix::unistd::setsid()?;
                Ok(())
            });
        }
        let child = command.spawn()?;
        let pid = child.id();
        std::fs::write(pid_path, pid.to_string())?;
        msg_info!(Message::WatcherStarted(pid));
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        let child = std::process::Command::new(current_exe)
            .args(["watch", "--daemon-run"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .creation_flags(CREATE_NO_WINDOW)
            .spawn()?;
        let pid = child.id();
        std::fs::write(pid_path, pid.to_string())?;
        msg_info!(Message::WatcherStarted(pid));
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = (pid_path, current_exe);
        msg_bail_anyhow!(Message::DaemonModeNotSupported);
    }

    Ok(())
}

/// Stops the running watcher. Not running is not an error.
pub fn stop() -> Result<()> {
    if running_pid()?.is_none() {
        msg_info!(Message::WatcherNotRunning);
        return Ok(());
    }
    stop_internal()
}

fn stop_internal() -> Result<()> {
    let pid_path = pid_path()?;
    let Some(pid) = running_pid()? else {
        msg_bail_anyhow!(Message::WatcherNotRunning);
    };

    let killed = kill_process(pid)?;

    // The watcher removes its own PID file on SIGTERM; a stale one is removed here.
    if let Err(e) = std::fs::remove_file(pid_path) {
        if e.kind() != ErrorKind::NotFound {
            return Err(e.into());
        }
    }

    if killed {
        msg_info!(Message::WatcherStopped(pid));
    } else {
        msg_info!(Message::WatcherNotRunning);
    }
    Ok(())
}

#[cfg(windows)]
fn kill_process(pid: u32) -> Result<bool> {
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{OpenProcess, TerminateProcess};
    use winapi::um::winnt::PROCESS_TERMINATE;

    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
        if handle.is_null() {
            let error = GetLastError();
            if error == 87 {
                // ERROR_INVALID_PARAMETER: no such process
                return Ok(false);
            }
            msg_bail_anyhow!(Message::FailedToOpenProcess(error));
        }

        let result = TerminateProcess(handle, 0);
        CloseHandle(handle);

        if result == 0 {
            msg_bail_anyhow!(Message::FailedToTerminateProcess(GetLastError()));
        }
        std::thread::sleep(Duration::from_millis(100));
        Ok(true)
    }
}

#[cfg(unix)]
fn kill_process(pid: u32) -> Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(pid as i32);

    match kill(pid, Signal::SIGTERM) {
        Ok(()) => {}
        Err(Errno::ESRCH) => return Ok(false),
        Err(e) => return Err(e.into()),
    }

    // Give the process time to terminate gracefully
    for _ in 0..20 {
        std::thread::sleep(Duration::from_millis(100));
        if kill(pid, None) == Err(Errno::ESRCH) {
            return Ok(true);
        }
    }

    // Still alive, force it
    match kill(pid, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(_) => msg_bail_anyhow!(Message::WatcherFailedToStop(pid.as_raw() as u32)),
    }
    std::thread::sleep(Duration::from_millis(100));
    Ok(true)
}

#[cfg(not(any(unix, windows)))]
fn kill_process(_pid: u32) -> Result<bool> {
    msg_bail_anyhow!(Message::ProcessTerminationNotSupported);
}

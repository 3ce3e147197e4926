// OS process enumeration used for client detection and credential discovery

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use crate::error::{LcuError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
  pub name: String,
  pub cmdline: String,
}

impl ProcessInfo {
  pub fn new(name: impl Into<String>, cmdline: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      cmdline: cmdline.into(),
    }
  }

  pub fn matches_any(&self, names: &[String]) -> bool {
    names.iter().any(|n| n == &self.name)
  }
}

pub trait ProcessLister {
  fn list(&self) -> Result<Vec<ProcessInfo>>;
}

/// Reads the live process table of the current OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessLister for SystemProcesses {
  #[cfg(target_os = "linux")]
  fn list(&self) -> Result<Vec<ProcessInfo>> {
    let mut processes = Vec::new();
    let entries =
      std::fs::read_dir("/proc").map_err(|e| LcuError::ProcessList(format!("/proc: {}", e)))?;

    for entry in entries.flatten() {
      let file_name = entry.file_name();
      let is_pid = file_name
        .to_str()
        .map_or(false, |s| s.chars().all(|c| c.is_ascii_digit()));
      if !is_pid {
        continue;
      }
      // Processes can exit between listing and reading
      let Ok(raw) = std::fs::read(entry.path().join("cmdline")) else {
        continue;
      };
      let args: Vec<String> = raw
        .split(|b| *b == 0)
        .filter(|a| !a.is_empty())
        .map(|a| String::from_utf8_lossy(a).into_owned())
        .collect();
      let Some(first) = args.first() else {
        continue;
      };
      processes.push(ProcessInfo::new(executable_name(first), args.join(" ")));
    }

    Ok(processes)
  }

  #[cfg(target_os = "macos")]
  fn list(&self) -> Result<Vec<ProcessInfo>> {
    let output = std::process::Command::new("ps")
      .args(["-axww", "-o", "args="])
      .output()
      .map_err(|e| LcuError::ProcessList(format!("Failed to execute ps: {}", e)))?;

    if !output.status.success() {
      return Err(LcuError::ProcessList(format!(
        "ps exited with {}",
        output.status
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(
      stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
          // Bundle paths contain spaces, so the executable ends at the first flag
          let exe = line.split(" --").next().unwrap_or(line);
          ProcessInfo::new(executable_name(exe), line)
        })
        .collect(),
    )
  }

  #[cfg(target_os = "windows")]
  fn list(&self) -> Result<Vec<ProcessInfo>> {
    const CREATE_NO_WINDOW: u32 = 0x08000000;

    let output = std::process::Command::new("powershell")
      .creation_flags(CREATE_NO_WINDOW)
      .args([
        "-NoProfile",
        "-Command",
        r#"Get-CimInstance Win32_Process | ForEach-Object { "$($_.Name)`t$($_.CommandLine)" }"#,
      ])
      .output()
      .map_err(|e| LcuError::ProcessList(format!("Failed to execute powershell: {}", e)))?;

    if !output.status.success() {
      return Err(LcuError::ProcessList(format!(
        "powershell exited with {}",
        output.status
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(
      stdout
        .lines()
        .filter_map(|line| {
          let (name, cmdline) = line.split_once('\t')?;
          let name = name.trim();
          (!name.is_empty()).then(|| ProcessInfo::new(name, cmdline.trim()))
        })
        .collect(),
    )
  }

  #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
  fn list(&self) -> Result<Vec<ProcessInfo>> {
    Err(LcuError::ProcessList(
      "process enumeration is not supported on this platform".to_string(),
    ))
  }
}

/// Final path component of an executable path, accepting both separators.
pub fn executable_name(path: &str) -> String {
  path
    .trim_matches('"')
    .rsplit(|c| c == '/' || c == '\\')
    .next()
    .unwrap_or(path)
    .to_string()
}

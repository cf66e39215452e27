//! Game process discovery and raw memory access.

use crate::error::{Error, Result};

/// A running process found by executable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

#[cfg(target_os = "windows")]
mod platform {
    use std::ffi::c_void;

    use tracing::debug;
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, PROCESSENTRY32W,
        Process32FirstW, Process32NextW, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
        TH32CS_SNAPPROCESS,
    };
    use windows::Win32::System::Threading::{
        OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
    };

    use super::ProcessInfo;
    use crate::error::{Error, Result};

    /// Open handle to the game process with read access
    pub struct ProcessHandle {
        pub pid: u32,
        pub base_address: u64,
        handle: HANDLE,
    }

    // SAFETY: the handle is only used for ReadProcessMemory, which may be
    // called from any thread, and is closed exactly once in Drop.
    unsafe impl Send for ProcessHandle {}
    unsafe impl Sync for ProcessHandle {}

    fn wide_to_string(wide: &[u16]) -> String {
        let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
        String::from_utf16_lossy(&wide[..len])
    }

    /// Find a process by executable name (case-insensitive)
    pub fn find_process(process_name: &str) -> Result<ProcessInfo> {
        // SAFETY: snapshot handle is closed before returning.
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| Error::ProcessNotFound(format!("process snapshot failed: {e}")))?;

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut found = None;
        // SAFETY: entry is a properly sized PROCESSENTRY32W.
        let mut next = unsafe { Process32FirstW(snapshot, &mut entry) };
        while next.is_ok() {
            let name = wide_to_string(&entry.szExeFile);
            if name.eq_ignore_ascii_case(process_name) {
                found = Some(ProcessInfo {
                    pid: entry.th32ProcessID,
                    name,
                });
                break;
            }
            // SAFETY: same snapshot and entry as above.
            next = unsafe { Process32NextW(snapshot, &mut entry) };
        }

        // SAFETY: snapshot was returned by CreateToolhelp32Snapshot.
        unsafe {
            let _ = CloseHandle(snapshot);
        }

        found.ok_or_else(|| Error::ProcessNotFound(process_name.to_string()))
    }

    fn main_module_base(pid: u32) -> Result<u64> {
        // SAFETY: snapshot handle is closed before returning.
        let snapshot =
            unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
                .map_err(|e| Error::ProcessOpenFailed(format!("module snapshot failed: {e}")))?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: entry is a properly sized MODULEENTRY32W.
        let result = unsafe { Module32FirstW(snapshot, &mut entry) }
            .map(|()| entry.modBaseAddr as u64)
            .map_err(|e| Error::ProcessOpenFailed(format!("main module not found: {e}")));

        // SAFETY: snapshot was returned by CreateToolhelp32Snapshot.
        unsafe {
            let _ = CloseHandle(snapshot);
        }

        result
    }

    impl ProcessHandle {
        /// Find the process by name and open it
        pub fn find_and_open(process_name: &str) -> Result<Self> {
            let info = find_process(process_name)?;
            Self::open(info.pid)
        }

        /// Open a process by PID
        pub fn open(pid: u32) -> Result<Self> {
            // SAFETY: the returned handle is owned by ProcessHandle and closed in Drop.
            let handle =
                unsafe { OpenProcess(PROCESS_VM_READ | PROCESS_QUERY_INFORMATION, false, pid) }
                    .map_err(|e| Error::ProcessOpenFailed(format!("pid {pid}: {e}")))?;

            let base_address = match main_module_base(pid) {
                Ok(base) => base,
                Err(e) => {
                    // SAFETY: handle was opened above and is not used afterwards.
                    unsafe {
                        let _ = CloseHandle(handle);
                    }
                    return Err(e);
                }
            };

            debug!("Opened pid {} with base 0x{:X}", pid, base_address);
            Ok(Self {
                pid,
                base_address,
                handle,
            })
        }

        pub(crate) fn read_raw(&self, address: u64, size: usize) -> Result<Vec<u8>> {
            let mut buffer = vec![0u8; size];
            let mut bytes_read = 0usize;

            // SAFETY: buffer is valid for `size` bytes and outlives the call.
            unsafe {
                ReadProcessMemory(
                    self.handle,
                    address as *const c_void,
                    buffer.as_mut_ptr().cast(),
                    size,
                    Some(&mut bytes_read as *mut usize),
                )
            }
            .map_err(|e| Error::read_failed(address, e.to_string()))?;

            if bytes_read != size {
                return Err(Error::read_failed(
                    address,
                    format!("short read: {bytes_read} of {size} bytes"),
                ));
            }

            Ok(buffer)
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: handle was opened by OpenProcess and is closed only here.
            unsafe {
                let _ = CloseHandle(self.handle);
            }
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod platform {
    use super::ProcessInfo;
    use crate::error::{Error, Result};

    /// Placeholder handle; attaching is only supported on Windows
    pub struct ProcessHandle {
        pub pid: u32,
        pub base_address: u64,
    }

    pub fn find_process(process_name: &str) -> Result<ProcessInfo> {
        Err(Error::ProcessNotFound(format!(
            "{process_name} (process lookup is only supported on Windows)"
        )))
    }

    impl ProcessHandle {
        pub fn find_and_open(process_name: &str) -> Result<Self> {
            let info = find_process(process_name)?;
            Self::open(info.pid)
        }

        pub fn open(pid: u32) -> Result<Self> {
            Err(Error::ProcessOpenFailed(format!(
                "pid {pid} (attaching is only supported on Windows)"
            )))
        }

        pub(crate) fn read_raw(&self, address: u64, _size: usize) -> Result<Vec<u8>> {
            Err(Error::read_failed(address, "not supported on this platform"))
        }
    }
}

pub use platform::{ProcessHandle, find_process};

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("base_address", &format_args!("{:#x}", self.base_address))
            .finish()
    }
}

/// Open the game process, by PID if given, otherwise by executable name
pub fn attach(process_name: &str, pid: Option<u32>) -> Result<ProcessHandle> {
    match pid {
        Some(pid) => ProcessHandle::open(pid),
        None => ProcessHandle::find_and_open(process_name),
    }
    .map_err(|e| match e {
        Error::ProcessNotFound(_) | Error::ProcessOpenFailed(_) => e,
        other => Error::ProcessOpenFailed(other.to_string()),
    })
}

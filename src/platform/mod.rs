//! Platform collaborators: privilege check and environment change broadcast.
//!
//! Both are opaque capabilities behind traits so the runner never depends on
//! the Win32 calling conventions. Non-Windows builds get inert fallbacks.

use thiserror::Error;

#[derive(Error, Debug)]
#[error("environment change broadcast failed: {0}")]
pub struct BroadcastError(pub String);

/// Gate for System scope processing.
pub trait PrivilegeChecker {
    fn is_elevated(&self) -> bool;
}

/// Best-effort notification that the environment block changed.
pub trait EnvironmentBroadcaster {
    fn notify(&self) -> Result<(), BroadcastError>;
}

/// Elevation probe against the current process token.
///
/// A failed probe reports "not elevated" so the run degrades to User scope
/// instead of aborting.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessElevation;

impl PrivilegeChecker for ProcessElevation {
    fn is_elevated(&self) -> bool {
        #[cfg(windows)]
        {
            windows_impl::is_elevated().unwrap_or(false)
        }
        #[cfg(not(windows))]
        {
            false
        }
    }
}

/// `WM_SETTINGCHANGE` broadcast so running shells pick up the new values.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettingChangeBroadcast;

impl EnvironmentBroadcaster for SettingChangeBroadcast {
    fn notify(&self) -> Result<(), BroadcastError> {
        #[cfg(windows)]
        {
            windows_impl::broadcast_setting_change()
        }
        #[cfg(not(windows))]
        {
            Ok(())
        }
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::BroadcastError;
    use windows::Win32::Foundation::{CloseHandle, HANDLE, LPARAM, WPARAM};
    use windows::Win32::Security::{
        GetTokenInformation, TOKEN_ELEVATION, TOKEN_QUERY, TokenElevation,
    };
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};
    use windows::Win32::UI::WindowsAndMessaging::{
        HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
    };

    fn to_wide(s: &str) -> Vec<u16> {
        let mut wide: Vec<u16> = s.encode_utf16().collect();
        wide.push(0);
        wide
    }

    pub(super) fn is_elevated() -> Option<bool> {
        unsafe {
            let mut token = HANDLE::default();
            OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).ok()?;

            let mut elevation = TOKEN_ELEVATION::default();
            let mut return_length = 0u32;
            let result = GetTokenInformation(
                token,
                TokenElevation,
                Some(&mut elevation as *mut _ as *mut _),
                std::mem::size_of::<TOKEN_ELEVATION>() as u32,
                &mut return_length,
            );
            let _ = CloseHandle(token);
            result.ok()?;

            Some(elevation.TokenIsElevated != 0)
        }
    }

    pub(super) fn broadcast_setting_change() -> Result<(), BroadcastError> {
        // Top-level windows receive "Environment" and re-read the registry.
        let section = to_wide("Environment");
        let mut result: usize = 0;
        let status = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                WPARAM(0),
                LPARAM(section.as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                5000,
                Some(&mut result),
            )
        };
        if status.0 == 0 {
            Err(BroadcastError(
                "SendMessageTimeoutW returned no result (timeout or hung receiver)".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

//! Registry-backed environment variable store.
//!
//! User variables live under `HKCU\Environment`, System variables under
//! `HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment`.
//! Values are read raw (`REG_EXPAND_SZ` is not expanded) and written back
//! with their original value type.

use super::{StoreAccessor, StoreError};
use crate::models::Scope;

/// Platform-neutral handle to the registry store.
///
/// On non-Windows hosts every operation reports the store as unavailable;
/// the run then records both scopes as failed instead of crashing.
#[derive(Debug, Default, Clone)]
pub struct RegistryStore;

impl RegistryStore {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl StoreAccessor for RegistryStore {
    fn list_variable_names(&self, scope: Scope) -> Result<Vec<String>, StoreError> {
        windows_impl::list_variable_names(scope)
    }

    fn get_value(&self, scope: Scope, name: &str) -> Result<String, StoreError> {
        windows_impl::get_value(scope, name)
    }

    fn set_value(&mut self, scope: Scope, name: &str, value: &str) -> Result<(), StoreError> {
        windows_impl::set_value(scope, name, value)
    }

    fn remove_value(&mut self, scope: Scope, name: &str) -> Result<(), StoreError> {
        windows_impl::remove_value(scope, name)
    }
}

#[cfg(not(windows))]
impl StoreAccessor for RegistryStore {
    fn list_variable_names(&self, _scope: Scope) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unsupported)
    }

    fn get_value(&self, _scope: Scope, _name: &str) -> Result<String, StoreError> {
        Err(StoreError::Unsupported)
    }

    fn set_value(&mut self, _scope: Scope, _name: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unsupported)
    }

    fn remove_value(&mut self, _scope: Scope, _name: &str) -> Result<(), StoreError> {
        Err(StoreError::Unsupported)
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use windows::Win32::Foundation::{ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
    use windows::Win32::System::Registry::{
        HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE,
        REG_EXPAND_SZ, REG_SAM_FLAGS, REG_SZ, REG_VALUE_TYPE, RRF_NOEXPAND, RRF_RT_REG_EXPAND_SZ,
        RRF_RT_REG_SZ, RegCloseKey, RegDeleteValueW, RegEnumValueW, RegGetValueW, RegOpenKeyExW,
        RegSetValueExW,
    };
    use windows::core::{PCWSTR, PWSTR};

    const USER_ENV_PATH: &str = "Environment";
    const SYSTEM_ENV_PATH: &str =
        r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

    // Registry value names are limited to 16383 characters.
    const MAX_VALUE_NAME: usize = 16384;

    fn scope_location(scope: Scope) -> (HKEY, &'static str) {
        match scope {
            Scope::User => (HKEY_CURRENT_USER, USER_ENV_PATH),
            Scope::System => (HKEY_LOCAL_MACHINE, SYSTEM_ENV_PATH),
        }
    }

    fn to_wide(s: &str) -> Vec<u16> {
        let mut wide: Vec<u16> = s.encode_utf16().collect();
        wide.push(0);
        wide
    }

    struct KeyGuard(HKEY);

    impl Drop for KeyGuard {
        fn drop(&mut self) {
            unsafe {
                let _ = RegCloseKey(self.0);
            }
        }
    }

    fn open_scope_key(scope: Scope, sam: REG_SAM_FLAGS) -> Result<KeyGuard, StoreError> {
        let (root, path) = scope_location(scope);
        let wide_path = to_wide(path); // keep the Vec alive across the call
        let mut key: HKEY = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(root, PCWSTR(wide_path.as_ptr()), Some(0), sam, &mut key)
        };
        if status != ERROR_SUCCESS {
            return Err(StoreError::Access {
                scope,
                reason: describe_status(status),
            });
        }
        Ok(KeyGuard(key))
    }

    fn describe_status(status: WIN32_ERROR) -> String {
        if status == ERROR_ACCESS_DENIED {
            "access denied".to_string()
        } else {
            format!("registry error status={}", status.0)
        }
    }

    pub(super) fn list_variable_names(scope: Scope) -> Result<Vec<String>, StoreError> {
        let key = open_scope_key(scope, KEY_QUERY_VALUE)?;

        let mut names = Vec::new();
        let mut index: u32 = 0;
        let mut name_buf = vec![0u16; MAX_VALUE_NAME];

        loop {
            let mut name_len = name_buf.len() as u32;
            let status = unsafe {
                RegEnumValueW(
                    key.0,
                    index,
                    PWSTR(name_buf.as_mut_ptr()),
                    &mut name_len,
                    None,
                    None,
                    None,
                    None,
                )
            };
            if status != ERROR_SUCCESS {
                break; // no more values
            }
            names.push(String::from_utf16_lossy(&name_buf[..name_len as usize]));
            index += 1;
        }

        Ok(names)
    }

    /// Read the raw value and its registry type without expanding %VAR% refs.
    fn get_raw(scope: Scope, name: &str) -> Result<(String, REG_VALUE_TYPE), StoreError> {
        let key = open_scope_key(scope, KEY_QUERY_VALUE)?;
        let wide_name = to_wide(name);
        let flags = RRF_RT_REG_SZ | RRF_RT_REG_EXPAND_SZ | RRF_NOEXPAND;

        let mut value_type = REG_VALUE_TYPE(0);
        let mut size_bytes: u32 = 0;
        let status = unsafe {
            RegGetValueW(
                key.0,
                PCWSTR::null(),
                PCWSTR(wide_name.as_ptr()),
                flags,
                Some(&mut value_type),
                None,
                Some(&mut size_bytes),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_value_error(status, scope, name));
        }

        let mut buffer: Vec<u16> = vec![0u16; (size_bytes as usize / 2).max(1)];
        let status = unsafe {
            RegGetValueW(
                key.0,
                PCWSTR::null(),
                PCWSTR(wide_name.as_ptr()),
                flags,
                Some(&mut value_type),
                Some(buffer.as_mut_ptr() as *mut _),
                Some(&mut size_bytes),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_value_error(status, scope, name));
        }

        // size_bytes includes the terminating null
        let char_len = (size_bytes as usize / 2).saturating_sub(1);
        buffer.truncate(char_len);
        Ok((String::from_utf16_lossy(&buffer), value_type))
    }

    fn map_value_error(status: WIN32_ERROR, scope: Scope, name: &str) -> StoreError {
        if status == ERROR_FILE_NOT_FOUND {
            StoreError::NotFound {
                scope,
                name: name.to_string(),
            }
        } else {
            StoreError::Access {
                scope,
                reason: describe_status(status),
            }
        }
    }

    pub(super) fn get_value(scope: Scope, name: &str) -> Result<String, StoreError> {
        get_raw(scope, name).map(|(value, _)| value)
    }

    pub(super) fn set_value(scope: Scope, name: &str, value: &str) -> Result<(), StoreError> {
        // Preserve REG_EXPAND_SZ on rewrite; new values default to REG_SZ.
        let value_type = match get_raw(scope, name) {
            Ok((_, existing_type)) if existing_type == REG_EXPAND_SZ => REG_EXPAND_SZ,
            _ => REG_SZ,
        };

        let key = open_scope_key(scope, KEY_SET_VALUE | KEY_QUERY_VALUE)
            .map_err(|err| write_error(err, scope, name))?;
        let wide_name = to_wide(name);
        let data = to_wide(value);
        let status = unsafe {
            RegSetValueExW(
                key.0,
                PCWSTR(wide_name.as_ptr()),
                Some(0),
                value_type,
                Some(std::slice::from_raw_parts(
                    data.as_ptr() as *const u8,
                    data.len() * 2,
                )),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(StoreError::Write {
                scope,
                name: name.to_string(),
                reason: describe_status(status),
            });
        }
        Ok(())
    }

    pub(super) fn remove_value(scope: Scope, name: &str) -> Result<(), StoreError> {
        let key = open_scope_key(scope, KEY_SET_VALUE | KEY_QUERY_VALUE)
            .map_err(|err| write_error(err, scope, name))?;
        let wide_name = to_wide(name);
        let status = unsafe { RegDeleteValueW(key.0, PCWSTR(wide_name.as_ptr())) };
        if status != ERROR_SUCCESS && status != ERROR_FILE_NOT_FOUND {
            return Err(StoreError::Write {
                scope,
                name: name.to_string(),
                reason: describe_status(status),
            });
        }
        Ok(())
    }

    /// Failures while applying one variable stay variable-local.
    fn write_error(err: StoreError, scope: Scope, name: &str) -> StoreError {
        match err {
            StoreError::Access { reason, .. } => StoreError::Write {
                scope,
                name: name.to_string(),
                reason,
            },
            other => other,
        }
    }
}

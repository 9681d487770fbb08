//! Production [`SimConnectClient`] backed by `SimConnect.dll`.
//!
//! The DLL ships with the Microsoft Flight Simulator SDK. It is loaded at
//! runtime so the binary starts (and reports a clear error) even when the
//! file is missing. On platforms other than Windows [`SimConnectLibrary::load`]
//! always fails with [`SimConnectError::Unsupported`].

use std::path::{Path, PathBuf};

use super::client::SimConnectClient;
use super::error::SimConnectError;
use super::protocol::{DataSetFlag, DataType, SimObjectType};

/// File name of the SimConnect client library.
pub const LIBRARY_FILE_NAME: &str = "SimConnect.dll";

/// Default location of the library: next to the running executable.
pub fn default_library_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LIBRARY_FILE_NAME)
}

/// SimConnect client talking to the simulator through `SimConnect.dll`.
pub struct SimConnectLibrary {
    inner: imp::Library,
}

impl SimConnectLibrary {
    /// Load the library from `path`.
    pub fn load(path: &Path) -> Result<Self, SimConnectError> {
        let inner = imp::Library::load(path)?;
        tracing::debug!(path = %path.display(), "SimConnect library loaded");
        Ok(Self { inner })
    }
}

impl SimConnectClient for SimConnectLibrary {
    fn open(&mut self, app_name: &str) -> Result<(), SimConnectError> {
        self.inner.open(app_name)
    }

    fn add_to_data_definition(
        &mut self,
        define_id: u32,
        name: &str,
        unit: &str,
        data_type: DataType,
    ) -> Result<(), SimConnectError> {
        self.inner
            .add_to_data_definition(define_id, name, unit, data_type)
    }

    fn request_data_on_sim_object_type(
        &mut self,
        request_id: u32,
        define_id: u32,
        radius_meters: u32,
        object_type: SimObjectType,
    ) -> Result<(), SimConnectError> {
        self.inner
            .request_data_on_sim_object_type(request_id, define_id, radius_meters, object_type)
    }

    fn get_next_dispatch(&mut self) -> Result<Option<Vec<u8>>, SimConnectError> {
        self.inner.get_next_dispatch()
    }

    fn set_data_on_sim_object(
        &mut self,
        define_id: u32,
        object_id: u32,
        flags: DataSetFlag,
        array_count: u32,
        data: &[u8],
    ) -> Result<(), SimConnectError> {
        self.inner
            .set_data_on_sim_object(define_id, object_id, flags, array_count, data)
    }

    fn close(&mut self) -> Result<(), SimConnectError> {
        self.inner.close()
    }
}

#[cfg(windows)]
mod imp {
    use std::ffi::{c_char, c_void, CString};
    use std::path::Path;
    use std::ptr;

    use super::super::error::{check_hresult, SimConnectError, E_FAIL};
    use super::super::protocol::{DataSetFlag, DataType, SimObjectType};

    type Handle = *mut c_void;
    type HResult = i32;

    /// `SIMCONNECT_UNUSED`
    const UNUSED: u32 = u32::MAX;

    type OpenFn =
        unsafe extern "system" fn(*mut Handle, *const c_char, *mut c_void, u32, *mut c_void, u32) -> HResult;
    type CloseFn = unsafe extern "system" fn(Handle) -> HResult;
    type AddToDataDefinitionFn =
        unsafe extern "system" fn(Handle, u32, *const c_char, *const c_char, u32, f32, u32) -> HResult;
    type RequestDataOnSimObjectTypeFn =
        unsafe extern "system" fn(Handle, u32, u32, u32, u32) -> HResult;
    type GetNextDispatchFn = unsafe extern "system" fn(Handle, *mut *mut u8, *mut u32) -> HResult;
    type SetDataOnSimObjectFn =
        unsafe extern "system" fn(Handle, u32, u32, u32, u32, u32, *mut c_void) -> HResult;

    /// Open SimConnect handle.
    struct RawHandle(Handle);

    // SAFETY: a SimConnect handle is an opaque token that may be used from any
    // thread as long as calls are not concurrent. `Library` is only reachable
    // through `&mut`, so calls are serialised.
    unsafe impl Send for RawHandle {}

    pub(super) struct Library {
        handle: Option<RawHandle>,
        open: OpenFn,
        close: CloseFn,
        add_to_data_definition: AddToDataDefinitionFn,
        request_data_on_sim_object_type: RequestDataOnSimObjectTypeFn,
        get_next_dispatch: GetNextDispatchFn,
        set_data_on_sim_object: SetDataOnSimObjectFn,
        // Keeps the function pointers above valid; dropped last.
        _library: libloading::Library,
    }

    /// Copy a function pointer out of the loaded library.
    ///
    /// # Safety
    ///
    /// `T` must match the exported function's real signature.
    unsafe fn symbol<T: Copy>(
        library: &libloading::Library,
        name: &'static str,
        nul_terminated: &'static [u8],
    ) -> Result<T, SimConnectError> {
        library
            .get::<T>(nul_terminated)
            .map(|s| *s)
            .map_err(|e| SimConnectError::MissingSymbol {
                symbol: name,
                reason: e.to_string(),
            })
    }

    fn c_string(value: &str) -> Result<CString, SimConnectError> {
        CString::new(value).map_err(|_| SimConnectError::InvalidString(value.to_string()))
    }

    impl Library {
        pub(super) fn load(path: &Path) -> Result<Self, SimConnectError> {
            // SAFETY: loading SimConnect.dll runs its DllMain, which has no
            // preconditions beyond being a genuine SimConnect client library.
            let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
                SimConnectError::LibraryLoad {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?;

            // SAFETY: the signatures match SimConnect.h.
            unsafe {
                Ok(Self {
                    handle: None,
                    open: symbol(&library, "SimConnect_Open", b"SimConnect_Open\0")?,
                    close: symbol(&library, "SimConnect_Close", b"SimConnect_Close\0")?,
                    add_to_data_definition: symbol(
                        &library,
                        "SimConnect_AddToDataDefinition",
                        b"SimConnect_AddToDataDefinition\0",
                    )?,
                    request_data_on_sim_object_type: symbol(
                        &library,
                        "SimConnect_RequestDataOnSimObjectType",
                        b"SimConnect_RequestDataOnSimObjectType\0",
                    )?,
                    get_next_dispatch: symbol(
                        &library,
                        "SimConnect_GetNextDispatch",
                        b"SimConnect_GetNextDispatch\0",
                    )?,
                    set_data_on_sim_object: symbol(
                        &library,
                        "SimConnect_SetDataOnSimObject",
                        b"SimConnect_SetDataOnSimObject\0",
                    )?,
                    _library: library,
                })
            }
        }

        fn handle(&self) -> Result<Handle, SimConnectError> {
            self.handle
                .as_ref()
                .map(|h| h.0)
                .ok_or(SimConnectError::NotOpen)
        }

        pub(super) fn open(&mut self, app_name: &str) -> Result<(), SimConnectError> {
            let name = c_string(app_name)?;
            let mut handle: Handle = ptr::null_mut();
            // SAFETY: `handle` and `name` outlive the call; no window or event
            // handle is supplied, so messages are polled.
            let hr = unsafe {
                (self.open)(
                    &mut handle,
                    name.as_ptr(),
                    ptr::null_mut(),
                    0,
                    ptr::null_mut(),
                    0,
                )
            };
            check_hresult("SimConnect_Open", hr)?;
            self.handle = Some(RawHandle(handle));
            Ok(())
        }

        pub(super) fn add_to_data_definition(
            &mut self,
            define_id: u32,
            name: &str,
            unit: &str,
            data_type: DataType,
        ) -> Result<(), SimConnectError> {
            let handle = self.handle()?;
            let name = c_string(name)?;
            let unit = c_string(unit)?;
            // SAFETY: valid open handle; strings outlive the call.
            let hr = unsafe {
                (self.add_to_data_definition)(
                    handle,
                    define_id,
                    name.as_ptr(),
                    unit.as_ptr(),
                    data_type as u32,
                    0.0,
                    UNUSED,
                )
            };
            check_hresult("SimConnect_AddToDataDefinition", hr)
        }

        pub(super) fn request_data_on_sim_object_type(
            &mut self,
            request_id: u32,
            define_id: u32,
            radius_meters: u32,
            object_type: SimObjectType,
        ) -> Result<(), SimConnectError> {
            let handle = self.handle()?;
            // SAFETY: valid open handle; all other arguments are plain values.
            let hr = unsafe {
                (self.request_data_on_sim_object_type)(
                    handle,
                    request_id,
                    define_id,
                    radius_meters,
                    object_type as u32,
                )
            };
            check_hresult("SimConnect_RequestDataOnSimObjectType", hr)
        }

        pub(super) fn get_next_dispatch(&mut self) -> Result<Option<Vec<u8>>, SimConnectError> {
            let handle = self.handle()?;
            let mut data: *mut u8 = ptr::null_mut();
            let mut size: u32 = 0;
            // SAFETY: valid open handle; out-pointers are live locals.
            let hr = unsafe { (self.get_next_dispatch)(handle, &mut data, &mut size) };
            if hr as u32 == E_FAIL {
                return Ok(None);
            }
            check_hresult("SimConnect_GetNextDispatch", hr)?;
            if data.is_null() || size == 0 {
                return Ok(None);
            }
            // SAFETY: on success SimConnect returns a buffer of `size` bytes that
            // stays valid until the next dispatch call; it is copied out here.
            let bytes = unsafe { std::slice::from_raw_parts(data, size as usize) }.to_vec();
            Ok(Some(bytes))
        }

        pub(super) fn set_data_on_sim_object(
            &mut self,
            define_id: u32,
            object_id: u32,
            flags: DataSetFlag,
            array_count: u32,
            data: &[u8],
        ) -> Result<(), SimConnectError> {
            let handle = self.handle()?;
            let mut buffer = data.to_vec();
            // SAFETY: valid open handle; SimConnect reads `buffer.len()` bytes
            // from `buffer`, which outlives the call.
            let hr = unsafe {
                (self.set_data_on_sim_object)(
                    handle,
                    define_id,
                    object_id,
                    flags as u32,
                    array_count,
                    buffer.len() as u32,
                    buffer.as_mut_ptr().cast::<c_void>(),
                )
            };
            check_hresult("SimConnect_SetDataOnSimObject", hr)
        }

        pub(super) fn close(&mut self) -> Result<(), SimConnectError> {
            let handle = self.handle.take().ok_or(SimConnectError::NotOpen)?;
            // SAFETY: the handle came from a successful open and is closed once.
            let hr = unsafe { (self.close)(handle.0) };
            check_hresult("SimConnect_Close", hr)
        }
    }

    impl Drop for Library {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                // SAFETY: as in `close`; the library is still loaded here.
                let _ = unsafe { (self.close)(handle.0) };
            }
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use std::convert::Infallible;
    use std::path::Path;

    use super::super::error::SimConnectError;
    use super::super::protocol::{DataSetFlag, DataType, SimObjectType};

    /// Uninhabited: SimConnect cannot be loaded here.
    pub(super) struct Library {
        never: Infallible,
    }

    impl Library {
        pub(super) fn load(_path: &Path) -> Result<Self, SimConnectError> {
            Err(SimConnectError::Unsupported)
        }

        pub(super) fn open(&mut self, _app_name: &str) -> Result<(), SimConnectError> {
            match self.never {}
        }

        pub(super) fn add_to_data_definition(
            &mut self,
            _define_id: u32,
            _name: &str,
            _unit: &str,
            _data_type: DataType,
        ) -> Result<(), SimConnectError> {
            match self.never {}
        }

        pub(super) fn request_data_on_sim_object_type(
            &mut self,
            _request_id: u32,
            _define_id: u32,
            _radius_meters: u32,
            _object_type: SimObjectType,
        ) -> Result<(), SimConnectError> {
            match self.never {}
        }

        pub(super) fn get_next_dispatch(&mut self) -> Result<Option<Vec<u8>>, SimConnectError> {
            match self.never {}
        }

        pub(super) fn set_data_on_sim_object(
            &mut self,
            _define_id: u32,
            _object_id: u32,
            _flags: DataSetFlag,
            _array_count: u32,
            _data: &[u8],
        ) -> Result<(), SimConnectError> {
            match self.never {}
        }

        pub(super) fn close(&mut self) -> Result<(), SimConnectError> {
            match self.never {}
        }
    }
}

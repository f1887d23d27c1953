//! # C Entry Points
//!
//! The OSEK call surface as `extern "C"` functions, for task code written
//! in C. Every function returns a [`StatusType`] and writes query results
//! through an out-pointer.
//!
//! The functions act on one process-wide kernel installed with [`install`].
//! Before that they return `InvalidState`.
//!
//! ```text
//! StatusType ActivateTask(TaskType task);
//! StatusType TerminateTask(void);
//! StatusType GetAlarmBase(AlarmType alarm, AlarmBaseType *info);
//! StatusType GetAlarm(AlarmType alarm, TickType *tick);
//! StatusType SetRelAlarm(AlarmType alarm, TickType increment, TickType cycle);
//! StatusType SetAbsAlarm(AlarmType alarm, TickType start, TickType cycle);
//! StatusType CancelAlarm(AlarmType alarm);
//! void print(const char *text);
//! ```
//!
//! A null out-pointer is a value error and is reported after the identity,
//! capability and state checks of the call itself.

#![allow(non_snake_case)]

use crate::scheduler::ReadyQueue;
use crate::SharedKernel;
use core::ffi::{c_char, CStr};
use core_types::{AlarmId, TaskId, TickType};
use kernel_api::{AlarmBase, KernelError, OsekApi, StatusType};
use log::{info, warn};
use spin::Mutex;

/// Alarm handle as seen from C
pub type AlarmType = usize;

/// Task handle as seen from C
pub type TaskType = u32;

/// C layout of [`AlarmBase`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmBaseType {
    pub maxallowedvalue: TickType,
    pub ticksperbase: TickType,
    pub mincycle: TickType,
}

impl From<AlarmBase> for AlarmBaseType {
    fn from(base: AlarmBase) -> Self {
        Self {
            maxallowedvalue: base.max_allowed_value,
            ticksperbase: base.ticks_per_base,
            mincycle: base.min_cycle,
        }
    }
}

static KERNEL: Mutex<Option<SharedKernel<ReadyQueue>>> = Mutex::new(None);

/// Makes `kernel` the target of the C entry points
///
/// Fails with `InvalidState` if a kernel is already installed.
pub fn install(kernel: SharedKernel<ReadyQueue>) -> Result<(), KernelError> {
    let mut slot = KERNEL.lock();
    if slot.is_some() {
        return Err(KernelError::InvalidState);
    }
    *slot = Some(kernel);
    info!("kernel installed behind the C entry points");
    Ok(())
}

/// Detaches the installed kernel, if any
pub fn uninstall() -> Option<SharedKernel<ReadyQueue>> {
    KERNEL.lock().take()
}

/// Runs `f` on a handle to the installed kernel
///
/// The global slot is released before `f` runs, so `f` only ever holds the
/// kernel's own critical section.
fn with_kernel<F>(f: F) -> StatusType
where
    F: FnOnce(&mut SharedKernel<ReadyQueue>) -> StatusType,
{
    let handle = KERNEL.lock().clone();
    match handle {
        Some(mut kernel) => f(&mut kernel),
        None => StatusType::InvalidState,
    }
}

fn alarm_id(alarm: AlarmType) -> Result<AlarmId, KernelError> {
    u32::try_from(alarm)
        .map(AlarmId::new)
        .map_err(|_| KernelError::InvalidId)
}

/// Writes a successful query result through `out`
///
/// # Safety
///
/// `out` must be null or valid for a write of `T`.
unsafe fn write_out<T>(out: *mut T, result: Result<T, KernelError>) -> StatusType {
    let value = match result {
        Ok(value) => value,
        Err(err) => return err.status(),
    };
    if out.is_null() {
        return StatusType::InvalidValue;
    }
    out.write(value);
    StatusType::Ok
}

#[no_mangle]
pub extern "C" fn ActivateTask(task: TaskType) -> StatusType {
    with_kernel(|kernel| kernel.activate_task(TaskId::new(task)).into())
}

/// Ends the running task
#[no_mangle]
pub extern "C" fn TerminateTask() -> StatusType {
    with_kernel(|kernel| kernel.terminate_current().into())
}

/// # Safety
///
/// `info` must be null or point to writable memory for an [`AlarmBaseType`].
#[no_mangle]
pub unsafe extern "C" fn GetAlarmBase(alarm: AlarmType, info: *mut AlarmBaseType) -> StatusType {
    with_kernel(|kernel| {
        let base = alarm_id(alarm).and_then(|id| kernel.get_alarm_base(id));
        write_out(info, base.map(AlarmBaseType::from))
    })
}

/// # Safety
///
/// `tick` must be null or point to writable memory for a [`TickType`].
#[no_mangle]
pub unsafe extern "C" fn GetAlarm(alarm: AlarmType, tick: *mut TickType) -> StatusType {
    with_kernel(|kernel| write_out(tick, alarm_id(alarm).and_then(|id| kernel.get_alarm(id))))
}

#[no_mangle]
pub extern "C" fn SetRelAlarm(alarm: AlarmType, increment: TickType, cycle: TickType) -> StatusType {
    with_kernel(|kernel| {
        alarm_id(alarm)
            .and_then(|id| kernel.set_rel_alarm(id, increment, cycle))
            .into()
    })
}

#[no_mangle]
pub extern "C" fn SetAbsAlarm(alarm: AlarmType, start: TickType, cycle: TickType) -> StatusType {
    with_kernel(|kernel| {
        alarm_id(alarm)
            .and_then(|id| kernel.set_abs_alarm(id, start, cycle))
            .into()
    })
}

#[no_mangle]
pub extern "C" fn CancelAlarm(alarm: AlarmType) -> StatusType {
    with_kernel(|kernel| alarm_id(alarm).and_then(|id| kernel.cancel_alarm(id)).into())
}

/// Forwards a line of task output to the log
///
/// # Safety
///
/// `text` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn print(text: *const c_char) {
    if text.is_null() {
        return;
    }
    match CStr::from_ptr(text).to_str() {
        Ok(line) => info!("{}", line),
        Err(_) => warn!("task printed a line that is not UTF-8"),
    }
}

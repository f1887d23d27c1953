//! C Entry Point Tests
//!
//! Validates the `extern "C"` call surface end to end against an installed
//! kernel: status codes, out-pointers and the hand-off to the tick source.
//!
//! The entry points share one process-wide kernel, so this file holds a
//! single scenario.

use core_types::TickType;
use kernel_api::{KernelError, OsekApi, StatusType, TaskState};
use sim_kernel::ffi::{
    self, ActivateTask, AlarmBaseType, CancelAlarm, GetAlarm, GetAlarmBase, SetAbsAlarm,
    SetRelAlarm, TerminateTask,
};
use sim_kernel::test_utils::{single_counter_config, SYSTEM_COUNTER, TASKS};
use std::ffi::CString;
use tests_resilience::shared_bootstrap;

/// Test: Task code written in C drives alarms and tasks through status codes
#[test]
fn test_c_entry_points() {
    assert_eq!(ActivateTask(0), StatusType::InvalidState);

    let shared = shared_bootstrap(single_counter_config(99, 5)).expect("valid config");
    ffi::install(shared.clone()).expect("first install");
    assert_eq!(ffi::install(shared.clone()), Err(KernelError::InvalidState));

    let mut base = AlarmBaseType::default();
    let mut tick: TickType = 0;
    unsafe {
        assert_eq!(GetAlarmBase(0, &mut base), StatusType::Ok);
        assert_eq!(
            base,
            AlarmBaseType {
                maxallowedvalue: 99,
                ticksperbase: 1,
                mincycle: 5
            }
        );
        assert_eq!(GetAlarmBase(0, std::ptr::null_mut()), StatusType::InvalidValue);
        assert_eq!(GetAlarmBase(42, &mut base), StatusType::InvalidId);

        assert_eq!(GetAlarm(0, &mut tick), StatusType::InvalidState);
        assert_eq!(SetRelAlarm(0, 10, 0), StatusType::Ok);
        assert_eq!(SetRelAlarm(0, 10, 0), StatusType::InvalidState);
        assert_eq!(SetRelAlarm(1, 10, 3), StatusType::InvalidValue);
        assert_eq!(GetAlarm(0, &mut tick), StatusType::Ok);
        assert_eq!(tick, 10);
        assert_eq!(GetAlarm(0, std::ptr::null_mut()), StatusType::InvalidValue);
        assert_eq!(GetAlarm(usize::MAX, &mut tick), StatusType::InvalidId);
    }

    assert_eq!(SetAbsAlarm(1, 40, 0), StatusType::Ok);
    assert_eq!(CancelAlarm(1), StatusType::Ok);
    assert_eq!(CancelAlarm(1), StatusType::Ok);

    // the tick source keeps using the Rust handle
    let fired = shared.tick_n(SYSTEM_COUNTER, 10).expect("known counter");
    assert_eq!(fired.len(), 1);
    assert_eq!(shared.get_task_state(TASKS[0]), Ok(TaskState::Ready));

    assert_eq!(TerminateTask(), StatusType::InvalidState);
    shared.dispatch(TASKS[0]).expect("task is ready");
    assert_eq!(ActivateTask(TASKS[0].0), StatusType::Ok);
    assert_eq!(ActivateTask(TASKS[0].0), StatusType::InvalidState);
    assert_eq!(TerminateTask(), StatusType::Ok);
    assert_eq!(shared.get_task_state(TASKS[0]), Ok(TaskState::Ready));

    let line = CString::new("hello from a task").expect("no interior NUL");
    unsafe { ffi::print(line.as_ptr()) };

    assert!(ffi::uninstall().is_some());
    assert_eq!(CancelAlarm(0), StatusType::InvalidState);
}

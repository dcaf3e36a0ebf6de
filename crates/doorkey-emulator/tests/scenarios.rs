//! End-to-end scenarios: both nodes, mock devices, in-memory line.

use std::time::Duration;

use doorkey_control::{ControlDevices, ControlError, ControlNode};
use doorkey_core::{AuthState, DeviceConfig, DoorState, Occupancy};
use doorkey_emulator::Emulator;
use doorkey_hardware::{
    MotorDirection,
    mock::{MockBuzzer, MockMotionSensor, MockMotor, MockStorage, StorageFault},
};
use doorkey_protocol::SerialLink;
use rstest::rstest;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

const MENU: &str = "+ : Open Door";
const PROVISION: &str = "12345= 12345=";

async fn provisioned() -> Emulator {
    let mut emulator = Emulator::builder().start().unwrap();
    emulator.keypad.send_keys(PROVISION).await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();
    emulator
}

#[tokio::test(start_paused = true)]
async fn test_provision_then_open_door() {
    let mut emulator = provisioned().await;
    let started = Instant::now();

    emulator.keypad.send_keys("+ 12345=").await.unwrap();
    emulator.wait_for_screen("Unlocking Door").await.unwrap();
    emulator.wait_for_screen("Locking Door").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(
        emulator.motor.drain(),
        vec![
            MotorDirection::Clockwise,
            MotorDirection::Stop,
            MotorDirection::AntiClockwise,
            MotorDirection::Stop
        ]
    );

    let report = emulator.shutdown().await.unwrap();
    assert!(report.interface_result.unwrap_err().is_disconnected());
    assert!(report.control_result.unwrap_err().is_link_closed());
    assert_eq!(report.control.door().current_state(), DoorState::Closed);
    assert_eq!(report.control.auth_state(), AuthState::Idle);
    assert_eq!(report.interface.auth_state(), AuthState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_door_held_while_occupied() {
    let mut emulator = provisioned().await;
    emulator
        .motion
        .script([Occupancy::Occupied, Occupancy::Occupied, Occupancy::Occupied]);

    emulator.keypad.send_keys("+ 12345=").await.unwrap();
    let holding = emulator.wait_for_screen("Wait for people").await.unwrap();
    assert_eq!(holding.row(1), "to enter");
    emulator.wait_for_screen("Locking Door").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    let report = emulator.shutdown().await.unwrap();
    assert_eq!(
        report.control.door().visited_states(),
        vec![
            DoorState::Closed,
            DoorState::Opening,
            DoorState::Open,
            DoorState::Closing,
            DoorState::Closed
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_three_failures_sound_alarm_then_unlock_again() {
    let mut emulator = provisioned().await;
    let started = Instant::now();

    emulator
        .keypad
        .send_keys("+ 99999= 99999= 99999=")
        .await
        .unwrap();
    emulator.wait_for_screen("ERROR!").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(60));
    assert_eq!(emulator.buzzer.drain(), vec![true, false]);
    assert!(emulator.motor.drain().is_empty());

    // counters are back to zero: the right password works first time
    emulator.keypad.send_keys("+ 12345=").await.unwrap();
    emulator.wait_for_screen("Unlocking Door").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    let report = emulator.shutdown().await.unwrap();
    assert_eq!(report.interface.attempts(), 0);
    assert_eq!(report.control.attempts(), 0);
    assert!(!report.control.buzzer().is_active());
}

#[tokio::test(start_paused = true)]
async fn test_failures_below_limit_do_not_lock() {
    let mut emulator = provisioned().await;

    emulator
        .keypad
        .send_keys("+ 11111= 22222= 12345=")
        .await
        .unwrap();
    emulator.wait_for_screen("Unlocking Door").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    assert!(emulator.buzzer.drain().is_empty());
    let report = emulator.shutdown().await.unwrap();
    assert_eq!(report.control.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_change_password() {
    let mut emulator = provisioned().await;

    emulator
        .keypad
        .send_keys("- 12345= 54321= 54321=")
        .await
        .unwrap();
    emulator.wait_for_screen("same pass:*****").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    // the old password is refused, the new one opens
    emulator
        .keypad
        .send_keys("+ 12345= 54321=")
        .await
        .unwrap();
    emulator.wait_for_screen("Unlocking Door").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    let report = emulator.shutdown().await.unwrap();
    let store = report.control.store();
    assert_eq!(store.active().map(|p| p.to_bytes()), Some([5, 4, 3, 2, 1]));
    assert_eq!(
        store.storage().peek(store.address(), 5),
        Some(&[5, 4, 3, 2, 1][..])
    );
}

#[tokio::test(start_paused = true)]
async fn test_provisioning_mismatch_asks_again() {
    let mut emulator = Emulator::builder().start().unwrap();

    emulator
        .keypad
        .send_keys("12345= 12346= 24680= 24680=")
        .await
        .unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    let report = emulator.shutdown().await.unwrap();
    assert_eq!(
        report.control.store().active().map(|p| p.to_bytes()),
        Some([2, 4, 6, 8, 0])
    );
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_storage_write_asks_again() {
    let mut emulator = Emulator::builder()
        .with_storage_fault(StorageFault::DropWrites)
        .start()
        .unwrap();

    emulator.keypad.send_keys(PROVISION).await.unwrap();
    emulator.wait_for_screen("same pass:").await.unwrap();
    // rejected, and the control node is still there for the next try
    emulator.wait_for_screen("Enter Pass:").await.unwrap();
    emulator.keypad.send_keys(PROVISION).await.unwrap();
    emulator.wait_for_screen("same pass:").await.unwrap();
    emulator.wait_for_screen("Enter Pass:").await.unwrap();
    assert!(!emulator.is_finished());

    let report = emulator.shutdown().await.unwrap();
    assert!(report.control_result.unwrap_err().is_link_closed());
    assert_eq!(report.control.storage_faults(), 2);
    assert!(!report.control.store().is_provisioned());
}

#[tokio::test(start_paused = true)]
async fn test_receive_timeout_spares_idle_menu_and_alarm() {
    let mut config = DeviceConfig::default();
    config.link.recv_timeout_ms = Some(5000);
    let mut emulator = Emulator::builder().with_config(config).start().unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    emulator.keypad.send_keys(PROVISION).await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    emulator.keypad.send_keys("+ 12345=").await.unwrap();
    emulator.wait_for_screen("Unlocking Door").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();

    emulator
        .keypad
        .send_keys("+ 99999= 99999= 99999=")
        .await
        .unwrap();
    emulator.wait_for_screen("ERROR!").await.unwrap();
    emulator.wait_for_screen(MENU).await.unwrap();
    assert!(!emulator.is_finished());

    let report = emulator.shutdown().await.unwrap();
    assert!(report.control_result.unwrap_err().is_link_closed());
    assert!(report.interface_result.unwrap_err().is_disconnected());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_config_rejected() {
    let mut config = DeviceConfig::default();
    config.auth.max_attempts = 0;

    assert!(Emulator::builder().with_config(config).start().is_err());
}

fn frame(seq: u8, kind: u8, value: u8) -> [u8; 4] {
    [seq, kind, value, seq ^ kind ^ value ^ 0xA5]
}

#[rstest]
#[case::corrupted_check_byte({
    let mut bad = frame(1, b'S', 2);
    bad[3] ^= 0x10;
    bad
})]
#[case::dropped_frame(frame(2, b'S', 2))]
#[case::symbol_out_of_range(frame(1, b'S', 42))]
#[tokio::test(start_paused = true)]
async fn test_line_noise_detected(#[case] second: [u8; 4]) {
    let config = DeviceConfig::default();
    let (mut line, node_end) = tokio::io::duplex(64);
    let devices = ControlDevices {
        motor: MockMotor::new().0,
        buzzer: MockBuzzer::new().0,
        motion: MockMotionSensor::new(Occupancy::Vacant).0,
        storage: MockStorage::new(),
    };
    let mut node = ControlNode::new(SerialLink::from_config(node_end, &config), devices, &config).unwrap();

    line.write_all(&frame(0, b'S', 1)).await.unwrap();
    line.write_all(&second).await.unwrap();

    let err = node.run().await.unwrap_err();
    assert!(matches!(err, ControlError::Link(ref e) if e.is_desync()), "{err}");
}

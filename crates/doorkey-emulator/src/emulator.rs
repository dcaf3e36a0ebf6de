//! Both nodes running on mock devices, joined by an in-memory serial line.
//!
//! # Examples
//!
//! ```no_run
//! use doorkey_emulator::Emulator;
//!
//! # async fn demo() -> doorkey_emulator::Result<()> {
//! let mut emulator = Emulator::builder().start()?;
//! emulator.keypad.send_keys("12345=12345=").await.ok();
//! emulator.wait_for_screen("+ : Open Door").await;
//!
//! let report = emulator.shutdown().await?;
//! assert!(report.control.store().is_provisioned());
//! # Ok(())
//! # }
//! ```

use doorkey_control::{ControlDevices, ControlError, ControlNode};
use doorkey_core::{DeviceConfig, Occupancy};
use doorkey_hardware::{
    MotorDirection,
    mock::{
        DisplaySnapshot, MockBuzzer, MockDisplay, MockKeypad, MockKeypadHandle, MockMotionHandle,
        MockMotionSensor, MockMotor, MockStorage, Recording, StorageFault,
    },
};
use doorkey_interface::{InterfaceError, InterfaceNode};
use doorkey_protocol::memory_pair;
use tokio::{io::DuplexStream, task::JoinHandle};
use tracing::{debug, info};

use crate::{error::Result, panel::PanelEvent};

pub type EmulatedInterface = InterfaceNode<DuplexStream, MockKeypad, MockDisplay>;
pub type EmulatedControl =
    ControlNode<DuplexStream, MockMotor, MockBuzzer, MockMotionSensor, MockStorage>;

type NodeTask<N, E> = JoinHandle<(N, std::result::Result<(), E>)>;

/// Builder for [`Emulator`].
#[derive(Debug)]
pub struct EmulatorBuilder {
    config: DeviceConfig,
    occupancy: Occupancy,
    storage: MockStorage,
}

impl Default for EmulatorBuilder {
    fn default() -> Self {
        Self {
            config: DeviceConfig::default(),
            occupancy: Occupancy::Vacant,
            storage: MockStorage::new(),
        }
    }
}

impl EmulatorBuilder {
    pub fn with_config(mut self, config: DeviceConfig) -> Self {
        self.config = config;
        self
    }

    /// Sensor level until changed through [`Emulator::motion`].
    pub fn with_initial_occupancy(mut self, occupancy: Occupancy) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_storage_fault(mut self, fault: StorageFault) -> Self {
        self.storage.set_fault(fault);
        self
    }

    /// Spawn both nodes on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `EmulatorError::Config` if the configuration is invalid.
    pub fn start(self) -> Result<Emulator> {
        self.config.validate()?;

        let (interface_link, control_link) = memory_pair(&self.config);
        let (keypad, keypad_handle) = MockKeypad::new();
        let (display, screens) = MockDisplay::new();
        let (motor, motor_rec) = MockMotor::new();
        let (buzzer, buzzer_rec) = MockBuzzer::new();
        let (motion, motion_handle) = MockMotionSensor::new(self.occupancy);

        let mut interface = InterfaceNode::new(interface_link, keypad, display, &self.config)?;
        let devices = ControlDevices {
            motor,
            buzzer,
            motion,
            storage: self.storage,
        };
        let mut control = ControlNode::new(control_link, devices, &self.config)?;

        let interface_task = tokio::spawn(async move {
            let result = interface.run().await;
            debug!(?result, "Interface node stopped");
            if let Err(e) = interface.hang_up().await {
                debug!(error = %e, "Interface link already down");
            }
            (interface, result)
        });
        let control_task = tokio::spawn(async move {
            let result = control.run().await;
            debug!(?result, "Control node stopped");
            if let Err(e) = control.hang_up().await {
                debug!(error = %e, "Control link already down");
            }
            (control, result)
        });
        info!("Emulator started");

        Ok(Emulator {
            keypad: keypad_handle,
            motion: motion_handle,
            screens,
            motor: motor_rec,
            buzzer: buzzer_rec,
            interface: interface_task,
            control: control_task,
        })
    }
}

/// Running pair of nodes.
///
/// The handles drive the inputs; the recordings collect the outputs.
#[derive(Debug)]
pub struct Emulator {
    pub keypad: MockKeypadHandle,
    pub motion: MockMotionHandle,
    pub screens: Recording<DisplaySnapshot>,
    pub motor: Recording<MotorDirection>,
    pub buzzer: Recording<bool>,
    interface: NodeTask<EmulatedInterface, InterfaceError>,
    control: NodeTask<EmulatedControl, ControlError>,
}

impl Emulator {
    pub fn builder() -> EmulatorBuilder {
        EmulatorBuilder::default()
    }

    /// Wait until the display shows `text` on one of its rows.
    ///
    /// Returns the matching snapshot, or `None` if the interface node stopped
    /// first. Earlier snapshots are consumed.
    pub async fn wait_for_screen(&mut self, text: &str) -> Option<DisplaySnapshot> {
        while let Some(snapshot) = self.screens.next().await {
            if snapshot.shows(text) {
                return Some(snapshot);
            }
        }
        None
    }

    /// Next output from any device, `None` once every device is gone.
    pub async fn next_event(&mut self) -> Option<PanelEvent> {
        tokio::select! {
            Some(snapshot) = self.screens.next() => Some(PanelEvent::Screen(snapshot)),
            Some(direction) = self.motor.next() => Some(PanelEvent::Motor(direction)),
            Some(active) = self.buzzer.next() => Some(PanelEvent::Buzzer(active)),
            else => None,
        }
    }

    /// Whether either node has stopped.
    pub fn is_finished(&self) -> bool {
        self.interface.is_finished() || self.control.is_finished()
    }

    /// Release the keypad and collect both nodes.
    ///
    /// The interface node stops at its next key read, which closes the line
    /// and stops the control node in turn. An exchange in progress is
    /// finished first. Clones of [`Emulator::keypad`] keep the keypad alive
    /// and must be dropped beforehand.
    ///
    /// # Errors
    ///
    /// Returns `EmulatorError::Join` if a node task panicked.
    pub async fn shutdown(self) -> Result<EmulatorReport> {
        drop(self.keypad);
        let (interface, interface_result) = self.interface.await?;
        let (control, control_result) = self.control.await?;
        info!("Emulator stopped");

        Ok(EmulatorReport {
            interface,
            interface_result,
            control,
            control_result,
        })
    }
}

/// Final state of both nodes after [`Emulator::shutdown`].
#[derive(Debug)]
pub struct EmulatorReport {
    pub interface: EmulatedInterface,
    pub interface_result: std::result::Result<(), InterfaceError>,
    pub control: EmulatedControl,
    pub control_result: std::result::Result<(), ControlError>,
}

//! Firmata hardware board.
//!
//! The wire protocol and the background reader belong to `hermes_five`. This
//! module maps pin specs onto its devices and keeps the last value each input
//! device reported, so pin reads poll that value without blocking. The board
//! itself is only compiled with the `firmata` feature.

/// Full scale of the board's 10-bit ADC.
pub const ADC_FULL_SCALE: f64 = 1023.0;

/// ADC count as a fraction of full scale, rounded to 4 places.
pub fn fraction(raw: u16) -> f64 {
    let value = f64::from(raw).min(ADC_FULL_SCALE) / ADC_FULL_SCALE;
    (value * 10_000.0).round() / 10_000.0
}

/// Device name of an analog channel, e.g. `A2`.
pub fn analog_pin_name(index: u8) -> String {
    format!("A{}", index)
}

#[cfg(feature = "firmata")]
mod hardware {
    use super::*;
    use crate::error::{Result, SamplerError};
    use crate::sensors::{Board, Pin, PinKind, PinSpec, PinValue};
    use hermes_five::devices::{AnalogInput, DigitalInput, InputEvent, Led};
    use hermes_five::hardware::{Board as Hermes, BoardEvent};
    use hermes_five::io::SerialProtocol;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tracing::info;

    /// How long the board gets to reset and finish the Firmata handshake.
    pub const READY_TIMEOUT: Duration = Duration::from_secs(10);

    type Latest<T> = Arc<Mutex<Option<T>>>;

    fn store<T>(latest: &Latest<T>, value: T) {
        if let Ok(mut slot) = latest.lock() {
            *slot = Some(value);
        }
    }

    /// Firmata board on a serial port.
    pub struct FirmataBoard {
        port_name: String,
        board: Hermes,
    }

    // input devices stay alive for their change handlers
    enum Device {
        Analog {
            _input: AnalogInput,
            latest: Latest<u16>,
        },
        Digital {
            _input: DigitalInput,
            latest: Latest<bool>,
        },
        Output(Led),
    }

    /// Pin handle handed out by [`FirmataBoard`].
    pub struct FirmataPin {
        spec: PinSpec,
        device: Device,
    }

    impl FirmataBoard {
        /// Open `port`, or the compiled-in default port when `None`, and wait
        /// until the board is ready.
        pub async fn open(port: Option<&str>) -> Result<Self> {
            let port_name = port.unwrap_or(crate::DEFAULT_PORT).to_string();
            let ready = Arc::new(Notify::new());

            let board = Hermes::from(SerialProtocol::new(&port_name)).open();
            let signal = Arc::clone(&ready);
            board.on(BoardEvent::OnReady, move |_: Hermes| {
                let signal = Arc::clone(&signal);
                async move {
                    signal.notify_one();
                    Ok(())
                }
            });

            tokio::time::timeout(READY_TIMEOUT, ready.notified())
                .await
                .map_err(|_| {
                    SamplerError::connection_error(format!(
                        "board on {} did not become ready within {}s",
                        port_name,
                        READY_TIMEOUT.as_secs()
                    ))
                })?;

            info!("Opened Firmata board on {}", port_name);
            Ok(Self { port_name, board })
        }
    }

    impl Board for FirmataBoard {
        type Pin = FirmataPin;

        fn port_name(&self) -> &str {
            &self.port_name
        }

        fn get_pin(&mut self, spec: PinSpec) -> Result<FirmataPin> {
            let device = match (spec.kind, spec.is_input()) {
                (PinKind::Analog, true) => {
                    let input = AnalogInput::new(&self.board, analog_pin_name(spec.index).as_str())?;
                    let latest: Latest<u16> = Arc::default();
                    let slot = Arc::clone(&latest);
                    input.on(InputEvent::OnChange, move |value: u16| {
                        let slot = Arc::clone(&slot);
                        async move {
                            store(&slot, value);
                            Ok(())
                        }
                    });
                    Device::Analog {
                        _input: input,
                        latest,
                    }
                }
                (PinKind::Digital, true) => {
                    let input = DigitalInput::new(&self.board, spec.index)?;
                    let latest: Latest<bool> = Arc::default();
                    let slot = Arc::clone(&latest);
                    input.on(InputEvent::OnChange, move |value: bool| {
                        let slot = Arc::clone(&slot);
                        async move {
                            store(&slot, value);
                            Ok(())
                        }
                    });
                    Device::Digital {
                        _input: input,
                        latest,
                    }
                }
                (PinKind::Digital, false) => {
                    Device::Output(Led::new(&self.board, spec.index, false)?)
                }
                (PinKind::Analog, false) => {
                    return Err(SamplerError::pin_error(format!(
                        "{} is not a supported pin",
                        spec
                    )))
                }
            };
            Ok(FirmataPin { spec, device })
        }
    }

    impl Pin for FirmataPin {
        fn spec(&self) -> PinSpec {
            self.spec
        }

        fn enable_reporting(&mut self) -> Result<()> {
            // input devices report from the moment they are created
            match self.device {
                Device::Output(_) => Err(SamplerError::pin_error(format!(
                    "{} is an output and cannot report",
                    self.spec
                ))),
                _ => Ok(()),
            }
        }

        fn read(&mut self) -> Option<PinValue> {
            match &self.device {
                Device::Analog { latest, .. } => {
                    let raw = (*latest.lock().ok()?)?;
                    Some(PinValue::Analog(fraction(raw)))
                }
                Device::Digital { latest, .. } => (*latest.lock().ok()?).map(PinValue::Digital),
                Device::Output(_) => None,
            }
        }

        fn write(&mut self, value: PinValue) -> Result<()> {
            let Device::Output(led) = &mut self.device else {
                return Err(SamplerError::pin_error(format!(
                    "{} is not a digital output",
                    self.spec
                )));
            };
            if value.as_bool() {
                led.turn_on()?;
            } else {
                led.turn_off()?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "firmata")]
pub use hardware::{FirmataBoard, FirmataPin, READY_TIMEOUT};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_scaling() {
        assert_eq!(fraction(0), 0.0);
        assert_eq!(fraction(1023), 1.0);
        assert_eq!(fraction(512), 0.5005);
        // counts above full scale clamp
        assert_eq!(fraction(4095), 1.0);
    }

    #[test]
    fn test_analog_pin_names() {
        assert_eq!(analog_pin_name(0), "A0");
        assert_eq!(analog_pin_name(15), "A15");
    }
}

//! Sensor Session Example
//!
//! Runs a probe session the way the wireless firmware does: a client polls
//! the moisture characteristic, then writes the shutdown command. The MCP3008
//! sits on a simulated bus so the example runs anywhere.
//!
//! ## What You'll Learn
//!
//! - Building an estimator from a JSON configuration
//! - Driving a `SensorSession` with read and write requests
//! - Exporting the reading log as CSV and JSON
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 03_sensor_session
//! ```

use soilgauge_core::{
    acquisition::Mcp3008,
    report::{history_json, CsvSink},
    session::{SensorSession, SessionCommand},
    time::SystemTime,
    traits::SpiBus,
    AcquisitionError, EstimatorConfig,
};

/// Stand-in for a spidev handle: a probe slowly drying out
struct SimulatedBus {
    code: u16,
}

impl SpiBus for SimulatedBus {
    fn transfer(&mut self, frame: &mut [u8; 3]) -> Result<(), AcquisitionError> {
        self.code = self.code.saturating_sub(37).max(150);
        *frame = [0, (self.code >> 8) as u8 & 0x03, self.code as u8];
        Ok(())
    }

    fn close(&mut self) {
        println!("[bus] closed");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("SoilGauge Sensor Session Example");
    println!("================================\n");

    let config = EstimatorConfig::from_json(
        r#"{
            "strategy": "interpolation",
            "points": [[220, 3.0], [365, 7.5], [680, 15.0]]
        }"#,
    )?;
    let estimator = config.build()?;

    let adc = Mcp3008::new(SimulatedBus { code: 720 }, 0)?;
    let mut session: SensorSession<_, _, _> = SensorSession::open(adc, estimator, SystemTime)?;
    let stop = session.shutdown_signal();

    let mut reads = 0;
    while !stop.is_requested() {
        let value = String::from_utf8_lossy(session.handle_read()).into_owned();
        reads += 1;
        println!("client read #{reads:2}: {value}%");

        if reads == 12 && session.handle_write(&[0x0F]) == SessionCommand::Shutdown {
            println!("client wrote 0x0F, stopping");
        }
    }

    println!("\nLast {} readings as CSV:", session.log().len());
    let mut sink = CsvSink::new(Vec::new());
    session.publish_history(&mut sink);
    print!("{}", String::from_utf8_lossy(&sink.into_inner()));

    println!("\nHistory payload:");
    println!("{}", history_json(session.log())?);

    session.close();
    Ok(())
}

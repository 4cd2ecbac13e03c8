use std::{
    env,
    io::{BufWriter, Read, Write},
    net::TcpStream,
    time::Duration,
};

use bytes::Bytes;
use nsq_proto::{Command, IdentifyOptions, Topic};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn main() -> Result<(), BoxError> {
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:4150".to_owned());
    let topic = Topic::try_from(env::args().nth(2).unwrap_or_else(|| "test".to_owned()))?;

    let stream = TcpStream::connect(&addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut reader = stream.try_clone()?;
    let mut writer = BufWriter::new(stream);

    // Protocol magic, sent once before any command
    writer.write_all(b"  V2")?;

    let options = IdentifyOptions::from_env()?.user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    send(&mut writer, &mut reader, &Command::identify(&options)?)?;

    for i in 0..10 {
        let command = Command::publish(&topic, Bytes::from(format!("MSG_{i}")));
        send(&mut writer, &mut reader, &command)?;
    }

    let command = Command::multi_publish(&topic, ["batch 1", "batch 2", "batch 3"])?;
    send(&mut writer, &mut reader, &command)?;

    let command = Command::deferred_publish(&topic, Duration::from_secs(10), "deferred");
    send(&mut writer, &mut reader, &command)?;

    Ok(())
}

/// Write `command`, then wait for the server response frame
fn send(
    writer: &mut BufWriter<TcpStream>,
    reader: &mut TcpStream,
    command: &Command,
) -> Result<(), BoxError> {
    let written = command.write_to(writer)?;
    writer.flush()?;
    println!("Sent {command} ({written} bytes)");

    // `<u32 size><u32 frame type><data>`
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;
    let [s0, s1, s2, s3, t0, t1, t2, t3] = header;
    let size = u32::from_be_bytes([s0, s1, s2, s3]);
    let frame_type = u32::from_be_bytes([t0, t1, t2, t3]);

    let mut data = vec![0u8; usize::try_from(size)?.saturating_sub(4)];
    reader.read_exact(&mut data)?;
    println!(
        "Received frame_type={frame_type} data={:?}",
        String::from_utf8_lossy(&data)
    );

    Ok(())
}

//! Config and transfer commands

use spihal_bus::open_bus;
use std::path::Path;

/// Parse hex byte arguments
///
/// Each argument may hold one or more bytes ("9f", "9f0000", "0x9f").
/// Whitespace, ':' and '_' separators inside an argument are ignored.
pub fn parse_hex(args: &[String]) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();

    for arg in args {
        let arg = arg
            .strip_prefix("0x")
            .or_else(|| arg.strip_prefix("0X"))
            .unwrap_or(arg);
        let digits: String = arg
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':' && *c != '_')
            .collect();

        if digits.len() % 2 != 0 {
            return Err(format!("Odd number of hex digits in '{}'", arg));
        }

        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|e| format!("Invalid hex byte '{}': {}", pair, e))?;
            bytes.push(byte);
        }
    }

    Ok(bytes)
}

/// Format bytes as a hex dump, 16 per line
fn format_hex(data: &[u8]) -> String {
    data.chunks(16)
        .enumerate()
        .map(|(i, line)| {
            let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
            format!("{:08x}: {}", i * 16, hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Open a bus and print the effective configuration
pub fn cmd_config(bus: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut handle = open_bus(bus)?;
    let config = handle.config()?;

    println!("mode:          {}", config.mode);
    println!("bits_per_word: {}", config.bits_per_word);
    println!("speed_hz:      {}", config.speed_hz);
    println!("delay_us:      {}", config.delay_us);
    println!("lsb_first:     {}", config.lsb_first);
    println!("sw_lsb_first:  {}", config.sw_lsb_first);

    handle.close()?;
    Ok(())
}

/// Perform one transfer
pub fn cmd_transfer(
    bus: &str,
    data: &[String],
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let write = match input {
        Some(path) => std::fs::read(path)?,
        None => parse_hex(data)?,
    };

    let mut handle = open_bus(bus)?;
    log::info!("Transferring {} bytes", write.len());
    let read = handle.transfer(&write)?;
    handle.close()?;

    match output {
        Some(path) => {
            std::fs::write(path, &read)?;
            log::info!("Wrote {} bytes to {}", read.len(), path.display());
        }
        None if !read.is_empty() => println!("{}", format_hex(&read)),
        None => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex(&args(&["9f", "00", "0A"])).unwrap(), vec![0x9f, 0x00, 0x0a]);
        assert_eq!(parse_hex(&args(&["0x9f0001"])).unwrap(), vec![0x9f, 0x00, 0x01]);
        assert_eq!(parse_hex(&args(&["de:ad_be ef"])).unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(parse_hex(&args(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_errors() {
        assert!(parse_hex(&args(&["abc"])).is_err());
        assert!(parse_hex(&args(&["zz"])).is_err());
    }

    #[test]
    fn test_format_hex() {
        let data: Vec<u8> = (0..18).collect();
        let dump = format_hex(&data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 00 01 02"));
        assert_eq!(lines[1], "00000010: 10 11");
    }

    #[cfg(feature = "stub")]
    #[test]
    fn test_transfer_through_stub_to_file() {
        let out = std::env::temp_dir().join(format!("spihal-cli-{}", std::process::id()));
        cmd_transfer("stub:dev=spidev0.0", &args(&["010203"]), None, Some(&out)).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), vec![1, 2, 3]);
        std::fs::remove_file(&out).unwrap();
    }
}

/*
 *     Copyright 2024 The Hostview Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::collector::{read_metrics, Snapshot};
use hostview_config::hostview::{self as config, OutputFormat, TableStyle};
use hostview_core::Result;
use std::io::{self, Write};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Panel, Style},
    Table, Tabled,
};
use tracing::instrument;

/// MB is the number of bytes in a megabyte.
const MB: u64 = 1024 * 1024;

/// GB is the number of bytes in a gigabyte.
const GB: u64 = 1024 * 1024 * 1024;

/// Formats a byte count in megabytes below one gigabyte and in gigabytes
/// otherwise, with two decimals, e.g. `512.00 MB` or `1.50 GB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < GB {
        return format!("{:.2} MB", bytes as f64 / MB as f64);
    }

    format!("{:.2} GB", bytes as f64 / GB as f64)
}

/// Returns the used share of the disk in percent, zero for an empty disk.
fn disk_used_percent(snapshot: &Snapshot) -> f64 {
    if snapshot.disk_size == 0 {
        return 0.0;
    }

    snapshot.disk_used as f64 / snapshot.disk_size as f64 * 100.0
}

#[derive(Debug, Tabled)]
struct CpuUsageRow {
    #[tabled(rename = "CPUs")]
    cpus: usize,

    #[tabled(rename = "CPU Usage")]
    usage: String,
}

#[derive(Debug, Tabled)]
struct CpuInfoRow {
    #[tabled(rename = "#")]
    index: usize,

    #[tabled(rename = "Vendor ID")]
    vendor_id: String,

    #[tabled(rename = "Family")]
    family: String,

    #[tabled(rename = "Cores")]
    cores: u32,

    #[tabled(rename = "Model")]
    model: String,

    #[tabled(rename = "Speed")]
    speed: String,
}

#[derive(Debug, Tabled)]
struct DiskRow {
    #[tabled(rename = "Disk Size")]
    size: String,

    #[tabled(rename = "Disk Free")]
    free: String,

    #[tabled(rename = "Disk Usage")]
    used: String,

    #[tabled(rename = "Disk Usage %")]
    used_percent: String,
}

#[derive(Debug, Tabled)]
struct MemoryRow {
    #[tabled(rename = "#")]
    index: usize,

    #[tabled(rename = "Total Memory")]
    total: String,

    #[tabled(rename = "Free Memory")]
    free: String,

    #[tabled(rename = "Used Memory")]
    used: String,

    #[tabled(rename = "Cache Memory")]
    cache: String,
}

#[derive(Debug, Tabled)]
struct PlatformRow {
    #[tabled(rename = "Hostname")]
    hostname: String,

    #[tabled(rename = "Running Processes")]
    running_processes: u64,

    #[tabled(rename = "Platform")]
    platform: String,

    #[tabled(rename = "Platform Version")]
    platform_version: String,
}

#[derive(Debug, Tabled)]
struct MacAddressRow {
    #[tabled(rename = "Mac Address")]
    mac_address: String,
}

#[derive(Debug, Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Interface")]
    name: String,

    #[tabled(rename = "IP Addresses")]
    addresses: String,
}

/// Report renders snapshots to a writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Report {
    /// Visual style of the tables.
    pub style: TableStyle,

    /// Output format, tables or JSON.
    pub format: OutputFormat,
}

/// Report implements the conversion from the report configuration.
impl From<&config::Report> for Report {
    fn from(config: &config::Report) -> Self {
        Report {
            style: config.style,
            format: config.format,
        }
    }
}

impl Report {
    /// Creates a report with the given style and format.
    pub fn new(style: TableStyle, format: OutputFormat) -> Self {
        Self { style, format }
    }

    /// Writes the snapshot to `writer` in the configured format.
    #[instrument(skip_all)]
    pub fn render<W: Write>(&self, snapshot: &Snapshot, writer: &mut W) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.render_tables(snapshot, writer)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, snapshot)?;
                writeln!(writer)?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Writes a blank line, then every section followed by a blank line.
    fn render_tables<W: Write>(&self, snapshot: &Snapshot, writer: &mut W) -> Result<()> {
        writeln!(writer)?;
        for table in self.tables(snapshot) {
            writeln!(writer, "{}", table)?;
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Builds the report sections in display order.
    fn tables(&self, snapshot: &Snapshot) -> Vec<Table> {
        let cpu_usage = vec![CpuUsageRow {
            cpus: snapshot.logical_cpus,
            usage: format!("{:.2}%", snapshot.cpu_percent),
        }];

        let cpu_info = snapshot.cpu_info.iter().map(|info| CpuInfoRow {
            index: info.index,
            vendor_id: info.vendor_id.clone(),
            family: info.family.clone(),
            cores: info.cores,
            model: info.model.clone(),
            speed: info.speed.clone(),
        });

        let disk = vec![DiskRow {
            size: format_bytes(snapshot.disk_size),
            free: format_bytes(snapshot.disk_free),
            used: format_bytes(snapshot.disk_used),
            used_percent: format!("{:.1}%", disk_used_percent(snapshot)),
        }];

        let memory = vec![MemoryRow {
            index: 1,
            total: format_bytes(snapshot.total_memory),
            free: format_bytes(snapshot.free_memory),
            used: format_bytes(snapshot.used_memory),
            cache: format_bytes(snapshot.cache_memory),
        }];

        let platform = vec![PlatformRow {
            hostname: snapshot.hostname.clone(),
            running_processes: snapshot.running_processes,
            platform: snapshot.platform.clone(),
            platform_version: snapshot.platform_version.clone(),
        }];

        let mac_address = vec![MacAddressRow {
            mac_address: snapshot.mac_address.clone(),
        }];

        let interfaces = snapshot.interfaces.iter().map(|interface| InterfaceRow {
            name: interface.name.clone(),
            addresses: interface.addresses.join(", "),
        });

        vec![
            self.table("CPU Usage", cpu_usage),
            self.table("CPU INFO", cpu_info),
            self.table("Disk usage", disk),
            self.table("System Memory", memory),
            self.table("Platform/System info:", platform),
            self.table("Mac Address:", mac_address),
            self.table("Network interfaces:", interfaces),
        ]
    }

    /// Builds a table with a centered title above a centered header row.
    fn table<T: Tabled>(&self, title: &str, rows: impl IntoIterator<Item = T>) -> Table {
        let mut table = Table::new(rows);
        table
            .with(Panel::header(title))
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Modify::new(Rows::one(1)).with(Alignment::center()));

        match self.style {
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Psql => table.with(Style::psql()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Blank => table.with(Style::blank()),
        };

        table
    }
}

/// Collects a snapshot of the local host and writes it to `writer` as
/// tables in the default style.
pub fn write_metrics<W: Write>(writer: &mut W) -> Result<()> {
    Report::default().render(&read_metrics(), writer)
}

/// Collects a snapshot of the local host and prints it to stdout.
pub fn print_metrics() -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_metrics(&mut handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{CpuInfo, InterfaceAddrs};

    fn render(report: Report, snapshot: &Snapshot) -> String {
        let mut output = Vec::new();
        report.render(snapshot, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            disk_size: 100 * GB,
            disk_free: 75 * GB,
            disk_used: 25 * GB,
            total_memory: 16 * GB,
            free_memory: 512 * MB,
            used_memory: 16 * GB - 512 * MB,
            cache_memory: 2 * GB,
            logical_cpus: 8,
            cpu_info: vec![CpuInfo {
                index: 0,
                vendor_id: "GenuineIntel".to_string(),
                family: "6".to_string(),
                cores: 4,
                model: "Intel(R) Xeon(R)".to_string(),
                speed: "2400.00 MHz".to_string(),
            }],
            cpu_percent: 12.3456,
            hostname: "builder".to_string(),
            running_processes: 321,
            platform: "ubuntu".to_string(),
            platform_version: "22.04".to_string(),
            mac_address: "aa:bb:cc:dd:ee:ff".to_string(),
            interfaces: vec![
                InterfaceAddrs {
                    name: "lo".to_string(),
                    addresses: vec!["127.0.0.1/8".to_string(), "::1/128".to_string()],
                },
                InterfaceAddrs {
                    name: "eth0".to_string(),
                    addresses: vec!["192.168.1.10/24".to_string()],
                },
            ],
        }
    }

    #[test]
    fn format_bytes_in_megabytes_and_gigabytes() {
        assert_eq!(format_bytes(0), "0.00 MB");
        assert_eq!(format_bytes(MB), "1.00 MB");
        assert_eq!(format_bytes(512 * MB), "512.00 MB");
        assert_eq!(format_bytes(GB - 1), "1024.00 MB");
        assert_eq!(format_bytes(GB), "1.00 GB");
        assert_eq!(format_bytes(3 * GB / 2), "1.50 GB");
        assert_eq!(format_bytes(2048 * GB), "2048.00 GB");
    }

    #[test]
    fn render_sections_in_order() {
        let output = render(Report::default(), &snapshot());
        assert!(output.starts_with('\n'));
        assert!(output.ends_with("\n\n"));

        let titles = [
            "CPU Usage",
            "CPU INFO",
            "Disk usage",
            "System Memory",
            "Platform/System info:",
            "Mac Address:",
            "Network interfaces:",
        ];
        let positions: Vec<usize> = titles
            .iter()
            .map(|title| output.find(title).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn render_formatted_values() {
        let output = render(Report::default(), &snapshot());
        assert!(output.contains("12.35%"));
        assert!(output.contains("100.00 GB"));
        assert!(output.contains("25.0%"));
        assert!(output.contains("512.00 MB"));
        assert!(output.contains("2400.00 MHz"));
        assert!(output.contains("127.0.0.1/8, ::1/128"));
        assert!(output.contains("aa:bb:cc:dd:ee:ff"));

        // Interfaces keep the snapshot order.
        assert!(output.find("127.0.0.1/8").unwrap() < output.find("192.168.1.10/24").unwrap());
    }

    #[test]
    fn render_centered_title_and_header() {
        let snapshot = Snapshot {
            mac_address: "02:fc:00:00:00:01".to_string(),
            ..Default::default()
        };

        let table = Report::default().tables(&snapshot)[5].to_string();
        assert!(table.contains("│   Mac Address:    │"), "{}", table);
        assert!(table.contains("│    Mac Address    │"), "{}", table);
        assert!(table.contains("│ 02:fc:00:00:00:01 │"), "{}", table);
    }

    #[test]
    fn render_empty_snapshot() {
        let report = Report::default();
        let snapshot = Snapshot::default();

        let tables = report.tables(&snapshot);
        assert_eq!(tables.len(), 7);

        // Title and header only.
        assert_eq!(tables[1].count_rows(), 2);
        assert_eq!(tables[6].count_rows(), 2);

        // Title, header and one row.
        assert_eq!(tables[0].count_rows(), 3);

        let output = render(report, &snapshot);
        assert!(output.contains("Vendor ID"));
        assert!(output.contains("IP Addresses"));
        assert!(output.contains("0.00%"));
        assert!(output.contains("0.0%"));
        assert!(!output.contains("NaN"));
    }

    #[test]
    fn render_zero_disk_percentage() {
        let snapshot = Snapshot {
            disk_size: 0,
            disk_free: 0,
            disk_used: 0,
            ..Default::default()
        };
        assert_eq!(disk_used_percent(&snapshot), 0.0);

        let output = render(Report::default(), &snapshot);
        assert!(output.contains("0.0%"));
    }

    #[test]
    fn render_with_every_style() {
        for style in TableStyle::ALL {
            let output = render(Report::new(style, OutputFormat::Table), &snapshot());
            assert!(output.contains("Network interfaces:"), "style {}", style);
            assert!(output.contains("builder"), "style {}", style);
        }

        let output = render(
            Report::new(TableStyle::Ascii, OutputFormat::Table),
            &snapshot(),
        );
        assert!(output.contains("+-"));
    }

    #[test]
    fn render_json() {
        let output = render(
            Report::new(TableStyle::default(), OutputFormat::Json),
            &snapshot(),
        );
        assert!(output.ends_with("}\n"));

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["hostname"], "builder");
        assert_eq!(value["logicalCpus"], 8);
        assert_eq!(value["cpuInfo"][0]["vendorId"], "GenuineIntel");
        assert_eq!(value["interfaces"][1]["name"], "eth0");
    }

    #[test]
    fn convert_from_config() {
        let config = config::Report {
            style: TableStyle::Markdown,
            format: OutputFormat::Json,
        };

        let report = Report::from(&config);
        assert_eq!(report.style, TableStyle::Markdown);
        assert_eq!(report.format, OutputFormat::Json);
    }
}

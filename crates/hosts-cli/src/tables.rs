//! Table rendering for list and stats output.

use chrono::{DateTime, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use hosts_model::{
    Backup, BackupStats, Config, ConfigSource, RemoteSource, SourceStatus, UpdateFrequency,
};

pub fn print_config_table(configs: &[Config]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Description"),
        header_cell("Source"),
        header_cell("Active"),
        header_cell("Updated"),
    ]);
    apply_table_style(&mut table);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(36)),
        ColumnConstraint::UpperBoundary(Width::Fixed(20)),
        ColumnConstraint::UpperBoundary(Width::Percentage(30)),
    ]);
    align_column(&mut table, 4, CellAlignment::Center);
    for config in configs {
        table.add_row(vec![
            id_cell(&config.id),
            Cell::new(&config.name),
            text_cell(&config.description),
            source_cell(config.source),
            active_cell(config.is_active),
            Cell::new(format_timestamp(config.updated_at)),
        ]);
    }
    println!("{table}");
}

pub fn print_backup_table(backups: &[Backup]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Created"),
        header_cell("Kind"),
        header_cell("Size"),
        header_cell("Tags"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(36)),
        ColumnConstraint::LowerBoundary(Width::Fixed(19)),
    ]);
    align_column(&mut table, 3, CellAlignment::Right);
    for backup in backups {
        table.add_row(vec![
            id_cell(&backup.id),
            Cell::new(format_timestamp(backup.timestamp)),
            kind_cell(backup.is_automatic),
            Cell::new(format_size(backup.size)),
            text_cell(&backup.tags.join(", ")),
            text_cell(&backup.description),
        ]);
    }
    println!("{table}");
}

pub fn print_remote_table(sources: &[RemoteSource]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("URL"),
        header_cell("Refresh"),
        header_cell("Status"),
        header_cell("Last updated"),
    ]);
    apply_table_style(&mut table);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(36)),
        ColumnConstraint::UpperBoundary(Width::Fixed(20)),
        ColumnConstraint::UpperBoundary(Width::Percentage(30)),
    ]);
    for source in sources {
        let last_updated = source
            .last_updated_at
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string());
        table.add_row(vec![
            id_cell(&source.id),
            Cell::new(&source.name),
            Cell::new(&source.url),
            frequency_cell(source.update_freq),
            status_cell(source.status),
            Cell::new(last_updated),
        ]);
    }
    println!("{table}");
}

pub fn print_backup_stats(stats: &BackupStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Backups"), Cell::new(stats.total)]);
    table.add_row(vec![Cell::new("Automatic"), Cell::new(stats.automatic)]);
    table.add_row(vec![Cell::new("Manual"), Cell::new(stats.manual)]);
    table.add_row(vec![
        Cell::new("Total size"),
        Cell::new(format_size(stats.total_size)),
    ]);
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value >= KIB * KIB {
        format!("{:.1} MiB", value / (KIB * KIB))
    } else if value >= KIB {
        format!("{:.1} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn id_cell(id: &str) -> Cell {
    Cell::new(id).fg(Color::Blue)
}

fn text_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn active_cell(is_active: bool) -> Cell {
    if is_active {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn kind_cell(is_automatic: bool) -> Cell {
    if is_automatic {
        dim_cell("auto")
    } else {
        Cell::new("manual")
    }
}

fn source_cell(source: ConfigSource) -> Cell {
    match source {
        ConfigSource::Local => Cell::new("local"),
        ConfigSource::Remote => Cell::new("remote").fg(Color::Magenta),
    }
}

fn frequency_cell(freq: UpdateFrequency) -> Cell {
    match freq {
        UpdateFrequency::Manual => Cell::new("manual"),
        UpdateFrequency::Startup => Cell::new("startup"),
    }
}

fn status_cell(status: SourceStatus) -> Cell {
    match status {
        SourceStatus::Pending => dim_cell("pending"),
        SourceStatus::Success => Cell::new("success").fg(Color::Green),
        SourceStatus::Failed => Cell::new("failed")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_picks_a_readable_unit() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn format_timestamp_is_second_resolution_utc() {
        let value = DateTime::parse_from_rfc3339("2024-03-01T09:30:05.123Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(value), "2024-03-01 09:30:05");
    }
}

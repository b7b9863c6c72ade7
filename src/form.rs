//! 日報の入力
//!
//! コマンドライン引数の解析と、dialoguer による対話入力

use crate::error::{ReportError, Result};
use daily_report_common::{parse_date, Entry, MaterialItem};
use dialoguer::{Confirm, Input};

/// `NAME=PCT` を解析（値のクランプは Entry 側）
pub fn parse_progress(raw: &str) -> Result<(String, i64)> {
    let (name, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| ReportError::Prompt(format!("進捗は 工程=数値 で指定してください: {}", raw)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ReportError::Prompt(format!("工程名が空です: {}", raw)));
    }
    let value = value
        .trim()
        .trim_end_matches('%')
        .parse::<i64>()
        .map_err(|_| ReportError::Prompt(format!("進捗率が数値ではありません: {}", raw)))?;
    Ok((name.to_string(), value))
}

/// `NAME:QTY[:YYYY-MM-DD[:NOTES]]` を解析
pub fn parse_material(raw: &str) -> Result<MaterialItem> {
    let mut parts = raw.splitn(4, ':');
    let name = parts.next().unwrap_or_default().trim();
    let quantity = parts.next().map(str::trim).unwrap_or_default();
    if name.is_empty() || quantity.is_empty() {
        return Err(ReportError::Prompt(format!("資材は 品名:数量[:納期[:備考]] で指定してください: {}", raw)));
    }

    let mut item = MaterialItem::new(name, quantity);
    if let Some(date) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        item.needed_by = Some(parse_date(date)?);
    }
    if let Some(notes) = parts.next() {
        item.notes = notes.trim().to_string();
    }
    Ok(item)
}

/// 進捗・資材の指定をまとめて反映
pub fn apply_arguments(entry: &mut Entry, progress: &[String], materials: &[String]) -> Result<()> {
    for raw in progress {
        let (name, value) = parse_progress(raw)?;
        entry.category_progress.set(&name, value);
    }
    for raw in materials {
        entry.add_material(parse_material(raw)?);
    }
    if !entry.material_items.is_empty() {
        entry.materials_required = true;
    }
    Ok(())
}

fn prompt_text(label: &str, current: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ReportError::Prompt(e.to_string()))
}

/// 対話入力（空Enterで現在値のまま）
pub fn run_interactive(entry: &mut Entry) -> Result<()> {
    println!("\n📋 工程ごとの進捗率 (0-100, 空Enterでそのまま)\n");

    let names: Vec<String> = entry.category_progress.names().map(str::to_string).collect();
    for name in names {
        let current = entry.category_progress.get(&name).unwrap_or(0);
        let input: String = Input::new()
            .with_prompt(format!("{} [{}%]", name, current))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ReportError::Prompt(e.to_string()))?;

        let trimmed = input.trim().trim_end_matches('%');
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<i64>() {
            Ok(value) => entry.category_progress.set(&name, value),
            Err(_) => println!("  ⚠ 数値ではないためスキップ: {}", input),
        }
    }

    loop {
        let extra: String = Input::new()
            .with_prompt("追加する工程 (NAME=PCT, 空Enterで終了)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ReportError::Prompt(e.to_string()))?;
        if extra.trim().is_empty() {
            break;
        }
        match parse_progress(&extra) {
            Ok((name, value)) => {
                entry.category_progress.add_category(&name);
                entry.category_progress.set(&name, value);
            }
            Err(e) => println!("  ⚠ {}", e),
        }
    }

    println!();
    entry.area = prompt_text("エリア", &entry.area)?;
    entry.weather = prompt_text("天気", &entry.weather)?;
    entry.manpower = prompt_text("人員", &entry.manpower)?;
    entry.obstacles = prompt_text("支障・課題", &entry.obstacles)?;
    entry.safety_incidents = prompt_text("安全・事故", &entry.safety_incidents)?;
    entry.notes = prompt_text("備考", &entry.notes)?;

    let needs_materials = Confirm::new()
        .with_prompt("資材の手配は必要ですか?")
        .default(entry.materials_required)
        .interact()
        .map_err(|e| ReportError::Prompt(e.to_string()))?;
    entry.materials_required = needs_materials;

    if needs_materials {
        loop {
            let raw: String = Input::new()
                .with_prompt("資材 (品名:数量[:納期[:備考]], 空Enterで終了)")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| ReportError::Prompt(e.to_string()))?;
            if raw.trim().is_empty() {
                break;
            }
            match parse_material(&raw) {
                Ok(item) => entry.add_material(item),
                Err(e) => println!("  ⚠ {}", e),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_progress() {
        assert_eq!(parse_progress("Demolition=80").unwrap(), ("Demolition".to_string(), 80));
        assert_eq!(parse_progress(" Tile Work = 35% ").unwrap(), ("Tile Work".to_string(), 35));
        assert_eq!(parse_progress("Framing=-5").unwrap().1, -5);
        assert!(parse_progress("Demolition").is_err());
        assert!(parse_progress("=10").is_err());
        assert!(parse_progress("Demolition=lots").is_err());
    }

    #[test]
    fn test_parse_material() {
        let item = parse_material("Drywall sheets:40:2024-03-08:4x8 moisture resistant").unwrap();
        assert_eq!(item.name, "Drywall sheets");
        assert_eq!(item.quantity, "40");
        assert_eq!(item.needed_by, NaiveDate::from_ymd_opt(2024, 3, 8));
        assert_eq!(item.notes, "4x8 moisture resistant");

        let item = parse_material("Screws:2 boxes").unwrap();
        assert!(item.needed_by.is_none());
        assert!(item.notes.is_empty());

        let item = parse_material("Grout:3::white: unsanded").unwrap();
        assert!(item.needed_by.is_none());
        assert_eq!(item.notes, "white: unsanded");

        assert!(parse_material("Screws").is_err());
        assert!(parse_material("Screws:1:next week").is_err());
    }

    #[test]
    fn test_apply_arguments_clamps_and_enables_materials() {
        let mut entry = Entry::blank(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        apply_arguments(
            &mut entry,
            &["Demolition=120".into(), "Roofing=40".into()],
            &["Lumber:12".into()],
        )
        .unwrap();

        assert_eq!(entry.category_progress.get("Demolition"), Some(100));
        assert_eq!(entry.category_progress.get("Roofing"), Some(40));
        assert!(entry.materials_required);
        assert_eq!(entry.material_items.len(), 1);
    }
}

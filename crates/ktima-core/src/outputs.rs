use serde::Serialize;

use crate::error::Result;
use crate::pipeline::TrendReport;

/// Byte-order marker expected by spreadsheet tools opening the
/// exported CSV; the payload itself is plain UTF-8.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Serialize the aggregate table as CSV: period, sales, traded_sqm,
/// one count column per observed age class, then one `<label>_pct`
/// column per class.
pub fn to_csv_bytes(report: &TrendReport) -> Result<Vec<u8>> {
    let labels = report.age_labels();

    let mut buffer = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);

        let mut header: Vec<String> = vec![
            "period".to_string(),
            "sales".to_string(),
            "traded_sqm".to_string(),
        ];
        header.extend(labels.iter().cloned());
        header.extend(labels.iter().map(|label| format!("{label}_pct")));
        writer.write_record(&header)?;

        for row in report.rows() {
            let mut record: Vec<String> = vec![
                row.period.clone(),
                row.sales.to_string(),
                row.traded_sqm.to_string(),
            ];
            record.extend(row.age_counts.iter().map(u64::to_string));
            record.extend(row.age_pct.iter().map(f64::to_string));
            writer.write_record(&record)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// Chart-ready view of a report for an external charting layer:
/// two line series plus the stacked age-mix series in counts and in
/// percent of sales (0-100).
#[derive(Debug, Clone, Serialize)]
pub struct ChartBundle {
    pub sales: Series,
    pub traded_sqm: Series,
    pub age_mix_counts: Vec<Series>,
    pub age_mix_pct: Vec<Series>,
}

pub fn chart_bundle(report: &TrendReport) -> ChartBundle {
    let labels = report.age_labels();

    let sales = Series {
        name: "sales".to_string(),
        points: report
            .rows()
            .iter()
            .map(|row| SeriesPoint {
                period: row.period.clone(),
                value: row.sales as f64,
            })
            .collect(),
    };

    let traded_sqm = Series {
        name: "traded_sqm".to_string(),
        points: report
            .rows()
            .iter()
            .map(|row| SeriesPoint {
                period: row.period.clone(),
                value: row.traded_sqm,
            })
            .collect(),
    };

    let age_mix_counts = labels
        .iter()
        .enumerate()
        .map(|(slot, label)| Series {
            name: label.clone(),
            points: report
                .rows()
                .iter()
                .map(|row| SeriesPoint {
                    period: row.period.clone(),
                    value: row.age_counts[slot] as f64,
                })
                .collect(),
        })
        .collect();

    let age_mix_pct = labels
        .iter()
        .enumerate()
        .map(|(slot, label)| Series {
            name: label.clone(),
            points: report
                .rows()
                .iter()
                .map(|row| SeriesPoint {
                    period: row.period.clone(),
                    value: row.age_pct[slot],
                })
                .collect(),
        })
        .collect();

    ChartBundle {
        sales,
        traded_sqm,
        age_mix_counts,
        age_mix_pct,
    }
}

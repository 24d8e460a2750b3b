// src/services/report_service.rs

use chrono::{NaiveDate, Utc};
use genpdf::{elements, style, Element};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::dashboard::DocProgress,
    services::{aggregation, dashboard_service::DashboardService},
};

const FONT_FAMILY: &str = "Roboto";

/// One printed table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub code: String,
    pub name: String,
    pub required: String,
    pub approved: String,
    pub percent: String,
    pub status: String,
    pub due_date: String,
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn report_rows(progress: &[DocProgress]) -> Vec<ReportRow> {
    let mut sorted: Vec<&DocProgress> = progress.iter().collect();
    sorted.sort_by(|a, b| a.row.doc_code.cmp(&b.row.doc_code));

    sorted
        .into_iter()
        .map(|p| ReportRow {
            code: p.row.doc_code.clone(),
            name: if p.row.is_critical {
                format!("{} (*)", p.row.doc_name)
            } else {
                p.row.doc_name.clone()
            },
            required: p.row.required_count.to_string(),
            approved: p.row.approved_count.to_string(),
            percent: format!("{}%", p.completion_percent),
            status: p.status_color.label_vi().to_string(),
            due_date: format_date(p.row.planned_due_date),
        })
        .collect()
}

fn pdf_error(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("PDF rendering failed: {e}"))
}

#[derive(Clone)]
pub struct ReportService {
    dashboard: DashboardService,
    catalog_repo: CatalogRepository,
    fonts_dir: String,
}

impl ReportService {
    pub fn new(
        dashboard: DashboardService,
        catalog_repo: CatalogRepository,
        fonts_dir: String,
    ) -> Self {
        Self {
            dashboard,
            catalog_repo,
            fonts_dir,
        }
    }

    /// Compliance report of one contractor as PDF bytes.
    pub async fn contractor_pdf(&self, contractor_id: Uuid) -> Result<Vec<u8>, AppError> {
        // 1. Data
        let contractor = self
            .catalog_repo
            .find_contractor(contractor_id)
            .await?
            .ok_or(AppError::NotFound("contractor"))?;
        let progress = self.dashboard.progress(Some(contractor_id), false).await?;
        let summary = aggregation::summary(&progress);
        let rows = report_rows(&progress);

        // 2. Document
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None)
            .map_err(|_| AppError::FontNotFound(self.fonts_dir.clone()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Báo cáo hồ sơ HSE - {}", contractor.name));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new("BÁO CÁO TUÂN THỦ HỒ SƠ HSE")
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Paragraph::new(format!("Nhà thầu: {}", contractor.name)));
        doc.push(elements::Paragraph::new(format!(
            "Ngày lập: {}",
            Utc::now().format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Hoàn thành: {}% ({}/{}) | Quá hạn bắt buộc: {}",
            summary.completion_percent,
            summary.approved_total,
            summary.required_total,
            summary.overdue_critical
        )));
        doc.push(elements::Break::new(1.5));

        // 3. Table
        let mut table = elements::TableLayout::new(vec![2, 5, 1, 1, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Mã").styled(bold))
            .element(elements::Paragraph::new("Hồ sơ").styled(bold))
            .element(elements::Paragraph::new("Yêu cầu").styled(bold))
            .element(elements::Paragraph::new("Duyệt").styled(bold))
            .element(elements::Paragraph::new("%").styled(bold))
            .element(elements::Paragraph::new("Trạng thái").styled(bold))
            .element(elements::Paragraph::new("Hạn nộp").styled(bold))
            .push()
            .map_err(pdf_error)?;

        for row in rows {
            table
                .row()
                .element(elements::Paragraph::new(row.code))
                .element(elements::Paragraph::new(row.name))
                .element(elements::Paragraph::new(row.required))
                .element(elements::Paragraph::new(row.approved))
                .element(elements::Paragraph::new(row.percent))
                .element(elements::Paragraph::new(row.status))
                .element(elements::Paragraph::new(row.due_date))
                .push()
                .map_err(pdf_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(1));
        doc.push(
            elements::Paragraph::new("(*) Hồ sơ bắt buộc")
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        // 4. Render to memory
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        tracing::info!(
            contractor_id = %contractor_id,
            bytes = buffer.len(),
            "Compliance report rendered"
        );
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::status::{
        derive,
        tests::{at, day, row},
        StatusPolicy,
    };

    #[test]
    fn rows_are_sorted_and_labelled() {
        let now = at(2024, 1, 10);
        let policy = StatusPolicy::default();

        let mut late = row(3, 1, Some(day(2024, 1, 1)), true);
        late.doc_code = "HSE-02".into();
        let mut open = row(2, 0, None, false);
        open.doc_code = "HSE-01".into();
        open.doc_name = "Danh sách nhân sự".into();

        let rows = report_rows(&[derive(late, now, &policy), derive(open, now, &policy)]);

        assert_eq!(rows[0].code, "HSE-01");
        assert_eq!(rows[0].due_date, "-");
        assert_eq!(rows[0].status, "Đang theo dõi");
        assert_eq!(rows[1].name, "Kế hoạch an toàn (*)");
        assert_eq!(rows[1].percent, "33%");
        assert_eq!(rows[1].status, "Quá hạn");
        assert_eq!(rows[1].due_date, "01/01/2024");
    }
}

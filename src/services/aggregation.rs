// src/services/aggregation.rs
//
// Reshapes derived progress rows into the dashboard views.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::models::dashboard::{
    ColorCounts, ComplianceMatrix, ContractorKpi, DashboardSummary, DocProgress, MatrixCell,
    MatrixDocType, MatrixRow, OverdueItem, StatusColor,
};
use crate::services::{status::completion_percent, suggestions::suggest_for};

fn capped_approved(p: &DocProgress) -> i64 {
    p.row.approved_count.min(p.row.required_count as i64).max(0)
}

fn is_overdue_critical(p: &DocProgress) -> bool {
    p.row.is_critical && p.status_color == StatusColor::Red
}

pub fn summary(progress: &[DocProgress]) -> DashboardSummary {
    let mut colors = ColorCounts::default();
    let mut required_total = 0i64;
    let mut approved_total = 0i64;
    let mut pending_review = 0i64;
    let mut contractors = HashSet::new();

    for p in progress {
        contractors.insert(p.row.contractor_id);
        colors.add(p.status_color);
        required_total += p.row.required_count.max(0) as i64;
        approved_total += capped_approved(p);
        pending_review += p.row.submitted_count;
    }

    DashboardSummary {
        contractor_count: contractors.len(),
        required_total,
        approved_total,
        completion_percent: completion_percent(approved_total, required_total),
        colors,
        overdue_critical: progress.iter().filter(|p| is_overdue_critical(p)).count(),
        pending_review,
    }
}

/// Weighted by doc type weight: sum(capped approved * w) / sum(required * w).
pub fn weighted_completion_percent(progress: &[&DocProgress]) -> u32 {
    let mut done = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    for p in progress {
        let weight = p.row.weight.max(Decimal::ZERO);
        done += Decimal::from(capped_approved(p)) * weight;
        total += Decimal::from(p.row.required_count.max(0)) * weight;
    }
    if total.is_zero() {
        return 0;
    }
    let pct = (done / total * Decimal::ONE_HUNDRED).round();
    pct.to_u32().unwrap_or(0).min(100)
}

/// One KPI line per contractor, least complete first.
pub fn contractor_kpis(progress: &[DocProgress]) -> Vec<ContractorKpi> {
    let mut grouped: HashMap<Uuid, Vec<&DocProgress>> = HashMap::new();
    for p in progress {
        grouped.entry(p.row.contractor_id).or_default().push(p);
    }

    let mut kpis: Vec<ContractorKpi> = grouped
        .into_iter()
        .map(|(contractor_id, rows)| {
            let mut colors = ColorCounts::default();
            let mut required_total = 0i64;
            let mut approved_total = 0i64;
            for p in &rows {
                colors.add(p.status_color);
                required_total += p.row.required_count.max(0) as i64;
                approved_total += capped_approved(p);
            }
            ContractorKpi {
                contractor_id,
                contractor_name: rows[0].row.contractor_name.clone(),
                required_total,
                approved_total,
                completion_percent: completion_percent(approved_total, required_total),
                weighted_completion_percent: weighted_completion_percent(&rows),
                colors,
                overdue_critical: rows.iter().filter(|p| is_overdue_critical(p)).count(),
            }
        })
        .collect();

    kpis.sort_by(|a, b| {
        a.completion_percent
            .cmp(&b.completion_percent)
            .then_with(|| a.contractor_name.cmp(&b.contractor_name))
    });
    kpis
}

/// Critical rows in red, most overdue first.
pub fn overdue_critical(progress: &[DocProgress]) -> Vec<OverdueItem> {
    let mut items: Vec<OverdueItem> = progress
        .iter()
        .filter(|p| is_overdue_critical(p))
        .map(|p| OverdueItem {
            contractor_id: p.row.contractor_id,
            contractor_name: p.row.contractor_name.clone(),
            doc_type_id: p.row.doc_type_id,
            doc_code: p.row.doc_code.clone(),
            doc_name: p.row.doc_name.clone(),
            required_count: p.row.required_count,
            approved_count: p.row.approved_count,
            planned_due_date: p.row.planned_due_date,
            overdue_days: p.overdue_days.unwrap_or(0),
            suggested_actions: suggest_for(p),
        })
        .collect();

    items.sort_by(|a, b| {
        b.overdue_days
            .cmp(&a.overdue_days)
            .then_with(|| a.contractor_name.cmp(&b.contractor_name))
            .then_with(|| a.doc_code.cmp(&b.doc_code))
    });
    items
}

/// Contractors (by name) x doc types (by code).
pub fn matrix(progress: &[DocProgress]) -> ComplianceMatrix {
    let mut doc_types: BTreeMap<(String, Uuid), MatrixDocType> = BTreeMap::new();
    let mut contractors: BTreeMap<(String, Uuid), HashMap<Uuid, MatrixCell>> = BTreeMap::new();

    for p in progress {
        doc_types
            .entry((p.row.doc_code.clone(), p.row.doc_type_id))
            .or_insert_with(|| MatrixDocType {
                doc_type_id: p.row.doc_type_id,
                code: p.row.doc_code.clone(),
                name: p.row.doc_name.clone(),
                is_critical: p.row.is_critical,
            });
        contractors
            .entry((p.row.contractor_name.clone(), p.row.contractor_id))
            .or_default()
            .insert(
                p.row.doc_type_id,
                MatrixCell {
                    doc_type_id: p.row.doc_type_id,
                    status_color: p.status_color,
                    completion_percent: p.completion_percent,
                },
            );
    }

    let doc_types: Vec<MatrixDocType> = doc_types.into_values().collect();
    let rows = contractors
        .into_iter()
        .map(|((contractor_name, contractor_id), mut cells)| MatrixRow {
            contractor_id,
            contractor_name,
            cells: doc_types.iter().map(|d| cells.remove(&d.doc_type_id)).collect(),
        })
        .collect();

    ComplianceMatrix { doc_types, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::status::{
        derive,
        tests::{at, day, row},
        StatusPolicy,
    };

    fn progress_for(
        contractor: (Uuid, &str),
        doc: (Uuid, &str),
        required: i32,
        approved: i64,
        critical: bool,
        due_day: Option<u32>,
    ) -> DocProgress {
        let mut r = row(required, approved, due_day.map(|d| day(2024, 1, d)), critical);
        r.contractor_id = contractor.0;
        r.contractor_name = contractor.1.to_string();
        r.doc_type_id = doc.0;
        r.doc_code = doc.1.to_string();
        derive(r, at(2024, 1, 20), &StatusPolicy::default())
    }

    fn fixture() -> (Vec<DocProgress>, Uuid, Uuid) {
        let an_phat = (Uuid::new_v4(), "An Phát");
        let binh_minh = (Uuid::new_v4(), "Bình Minh");
        let plan = (Uuid::new_v4(), "HSE-01");
        let permit = (Uuid::new_v4(), "HSE-02");

        let rows = vec![
            // overdue 19 days, critical -> red
            progress_for(an_phat, plan, 3, 1, true, Some(1)),
            // complete, over-approved
            progress_for(an_phat, permit, 2, 5, false, Some(1)),
            // overdue 5 days, critical -> red
            progress_for(binh_minh, plan, 2, 0, true, Some(15)),
            // nothing required
            progress_for(binh_minh, permit, 0, 0, false, None),
        ];
        (rows, an_phat.0, binh_minh.0)
    }

    #[test]
    fn summary_caps_over_approval() {
        let (rows, _, _) = fixture();
        let s = summary(&rows);

        assert_eq!(s.contractor_count, 2);
        assert_eq!(s.required_total, 7);
        assert_eq!(s.approved_total, 3);
        assert_eq!(s.completion_percent, 43);
        assert_eq!(s.colors.red, 2);
        assert_eq!(s.colors.green, 1);
        assert_eq!(s.colors.not_applicable, 1);
        assert_eq!(s.overdue_critical, 2);
    }

    #[test]
    fn kpis_sorted_least_complete_first() {
        let (rows, an_phat, binh_minh) = fixture();
        let kpis = contractor_kpis(&rows);

        assert_eq!(kpis.len(), 2);
        assert_eq!(kpis[0].contractor_id, binh_minh);
        assert_eq!(kpis[0].completion_percent, 0);
        assert_eq!(kpis[1].contractor_id, an_phat);
        assert_eq!(kpis[1].completion_percent, 60);
        assert_eq!(kpis[1].overdue_critical, 1);
    }

    #[test]
    fn weighted_completion_uses_doc_weights() {
        let (mut rows, _, _) = fixture();
        rows[0].row.weight = Decimal::new(3, 0);
        let an_phat: Vec<&DocProgress> = rows.iter().take(2).collect();
        // (1*3 + 2*1) / (3*3 + 2*1) = 5/11
        assert_eq!(weighted_completion_percent(&an_phat), 45);
        assert_eq!(weighted_completion_percent(&[]), 0);
    }

    #[test]
    fn overdue_list_most_late_first_with_actions() {
        let (rows, an_phat, _) = fixture();
        let items = overdue_critical(&rows);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].contractor_id, an_phat);
        assert_eq!(items[0].overdue_days, 19);
        assert_eq!(items[1].overdue_days, 5);
        assert_eq!(items[0].suggested_actions.len(), 3);
        assert_eq!(items[1].suggested_actions.len(), 2);
    }

    #[test]
    fn matrix_aligns_cells_with_doc_types() {
        let (mut rows, _, binh_minh) = fixture();
        rows.pop();
        let m = matrix(&rows);

        let codes: Vec<_> = m.doc_types.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["HSE-01", "HSE-02"]);
        assert_eq!(m.rows.len(), 2);
        assert_eq!(m.rows[0].contractor_name, "An Phát");
        assert_eq!(m.rows[1].contractor_id, binh_minh);
        assert!(m.rows[1].cells[1].is_none());
        assert_eq!(m.rows[0].cells[1].as_ref().unwrap().status_color, StatusColor::Green);
    }
}

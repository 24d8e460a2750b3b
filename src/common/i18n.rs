// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_LANG: &str = "vi";

// Message tables, one per supported language.
const VI: &[(&str, &str)] = &[
    ("error.validation", "Một hoặc nhiều trường không hợp lệ."),
    ("error.email_exists", "Email này đã được sử dụng."),
    ("error.email_not_allowed", "Email này chưa được cấp quyền đăng ký."),
    ("error.invalid_credentials", "Email hoặc mật khẩu không đúng."),
    ("error.invalid_token", "Phiên đăng nhập không hợp lệ hoặc đã hết hạn."),
    ("error.account_deactivated", "Tài khoản đã bị vô hiệu hóa."),
    ("error.forbidden", "Bạn không có quyền thực hiện thao tác này."),
    ("error.admin_only", "Chỉ quản trị viên mới được thực hiện thao tác này."),
    ("error.user_not_found", "Không tìm thấy người dùng."),
    ("error.not_found", "Không tìm thấy dữ liệu."),
    ("error.invalid_transition", "Trạng thái hồ sơ không cho phép thao tác này."),
    ("error.note_required", "Vui lòng nhập lý do khi yêu cầu chỉnh sửa."),
    ("error.unknown_action", "Thao tác không được hỗ trợ."),
    ("error.self_delete", "Không thể tự xóa tài khoản của chính mình."),
    ("error.super_admin_protected", "Không thể thay đổi tài khoản quản trị cấp cao."),
    ("error.admin_exists", "Hệ thống đã có quản trị viên."),
    ("error.run_token", "Mã chạy không hợp lệ."),
    ("error.contractor_required", "Tài khoản nhà thầu phải gắn với một nhà thầu."),
    ("error.report_fonts", "Không tải được phông chữ cho báo cáo."),
    ("error.internal", "Đã xảy ra lỗi không mong muốn."),
    ("db.duplicate", "Bản ghi đã tồn tại."),
    ("db.foreign_key", "Dữ liệu liên quan không tồn tại hoặc đang được sử dụng."),
    ("db.check", "Giá trị không hợp lệ."),
    ("db.not_null", "Thiếu trường bắt buộc."),
    ("db.forbidden", "Bạn không có quyền truy cập dữ liệu này."),
];

const EN: &[(&str, &str)] = &[
    ("error.validation", "One or more fields are invalid."),
    ("error.email_exists", "This email is already in use."),
    ("error.email_not_allowed", "This email is not allowed to register."),
    ("error.invalid_credentials", "Invalid email or password."),
    ("error.invalid_token", "Invalid or missing authentication token."),
    ("error.account_deactivated", "This account has been deactivated."),
    ("error.forbidden", "You are not allowed to perform this action."),
    ("error.admin_only", "Only administrators can perform this action."),
    ("error.user_not_found", "User not found."),
    ("error.not_found", "Record not found."),
    ("error.invalid_transition", "The submission status does not allow this action."),
    ("error.note_required", "A note is required when requesting a revision."),
    ("error.unknown_action", "Unsupported action."),
    ("error.self_delete", "You cannot delete your own account."),
    ("error.super_admin_protected", "The super admin account cannot be changed."),
    ("error.admin_exists", "An administrator already exists."),
    ("error.run_token", "Invalid run token."),
    ("error.contractor_required", "Contractor accounts must be linked to a contractor."),
    ("error.report_fonts", "Could not load report fonts."),
    ("error.internal", "An unexpected error occurred."),
    ("db.duplicate", "Record already exists."),
    ("db.foreign_key", "Related record is missing or still in use."),
    ("db.check", "Invalid value."),
    ("db.not_null", "A required field is missing."),
    ("db.forbidden", "You do not have access to this data."),
];

static SHARED: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

/// Localized message lookup keyed by language then message key.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("vi", VI.iter().copied().collect());
        messages.insert("en", EN.iter().copied().collect());
        Self { messages }
    }

    /// Process-wide store for paths that have no `AppState` at hand.
    pub fn shared() -> &'static I18nStore {
        &SHARED
    }

    /// Falls back to the default language, then to the key itself.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|t| t.get(key)))
            .map(|m| m.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.messages.contains_key(lang)
    }
}

/// Maps a raw database error message to a message key by substring.
pub fn classify_db_message(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("duplicate key") {
        "db.duplicate"
    } else if lower.contains("foreign key") {
        "db.foreign_key"
    } else if lower.contains("check constraint") {
        "db.check"
    } else if lower.contains("not-null") || lower.contains("null value") {
        "db.not_null"
    } else if lower.contains("permission denied") || lower.contains("row-level security") {
        "db.forbidden"
    } else {
        "error.internal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_tables_cover_the_same_keys() {
        let vi: Vec<_> = VI.iter().map(|(k, _)| *k).collect();
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(vi, en);
    }

    #[test]
    fn translate_falls_back_to_vietnamese_then_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "db.duplicate"), "Record already exists.");
        assert_eq!(store.translate("fr", "db.duplicate"), "Bản ghi đã tồn tại.");
        assert_eq!(store.translate("en", "no.such.key"), "no.such.key");
    }

    #[test]
    fn classifies_postgres_messages() {
        assert_eq!(
            classify_db_message(
                "duplicate key value violates unique constraint \"doc_types_code_key\""
            ),
            "db.duplicate"
        );
        assert_eq!(
            classify_db_message(
                "insert or update on table \"submissions\" violates foreign key constraint"
            ),
            "db.foreign_key"
        );
        assert_eq!(
            classify_db_message(
                "new row for relation \"submissions\" violates check constraint \
                 \"submissions_cnt_check\""
            ),
            "db.check"
        );
        assert_eq!(
            classify_db_message(
                "null value in column \"name\" of relation \"contractors\" \
                 violates not-null constraint"
            ),
            "db.not_null"
        );
        assert_eq!(classify_db_message("permission denied for table profiles"), "db.forbidden");
        assert_eq!(classify_db_message("connection reset"), "error.internal");
    }
}

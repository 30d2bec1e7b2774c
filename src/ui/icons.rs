//! Shared UI icons.
//!
//! Each icon falls back to plain ASCII on terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

// Session indicators
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "");
pub static USER: Emoji<'_, '_> = Emoji("👤 ", "");

// Record indicators
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
pub static TASK: Emoji<'_, '_> = Emoji("📝 ", "- ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

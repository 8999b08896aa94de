//! Status lines shown locally and pushed to the controller

pub(crate) const STARTING: &str = "⏳ กำลังเริ่มต้นระบบ...\nกรุณารอสักครู่";
pub(crate) const READY: &str = "✅ พร้อมใช้งาน\nเสียบบัตรเพื่อเริ่มอ่านข้อมูล";
pub(crate) const OPENING: &str = "⏳ กำลังเชื่อมต่อเครื่องอ่านบัตร...";
pub(crate) const RECONNECTING: &str = "⏳ กำลังเชื่อมต่อใหม่...\nกรุณารอสักครู่";
pub(crate) const WAITING_PERMISSION: &str = "⏳ รอการอนุญาตใช้งานเครื่องอ่านบัตร...";
pub(crate) const PERMISSION_DENIED: &str =
    "❌ ไม่ได้รับอนุญาตใช้งาน USB\nกรุณาอนุญาตและกดปุ่ม \"เชื่อมต่อใหม่\"";
pub(crate) const OPEN_FAILED: &str = "❌ ไม่สามารถเชื่อมต่อได้\n\
    กรุณาเสียบเครื่องอ่านบัตรใหม่\n\
    และตรวจสอบว่ามีบัตรอยู่ในเครื่อง\n\
    แล้วกดปุ่ม \"เชื่อมต่อใหม่\"";
pub(crate) const DISCONNECTED: &str =
    "ไม่เชื่อมต่อ\nกรุณาเสียบเครื่องอ่านบัตรใหม่\nและกดปุ่ม \nเชื่อมต่อใหม่\n";
pub(crate) const NOT_READY: &str = "❌ เครื่องอ่านบัตรไม่พร้อม\nกรุณากดปุ่ม \"เชื่อมต่อใหม่\"";
pub(crate) const READING: &str = "⏳ กำลังอ่านข้อมูลบัตร...\nกรุณารอสักครู่";
pub(crate) const NO_CARD: &str = "ไม่พบบัตรประชาชน\nกรุณาเสียบบัตรให้แน่น";
pub(crate) const READING_PHOTO: &str = "⏳ กำลังอ่านรูปภาพ...\n(ประมาณ 5-10 วินาที)";
pub(crate) const READ_OK: &str = "สำเร็จ!\nถอดบัตรออกแล้วเสียบใหม่เพื่ออ่านต่อ";
pub(crate) const CLEARED: &str = "✅ เคลียข้อมูลแล้ว";
pub(crate) const SAVED: &str = "💾 บันทึกข้อมูลเรียบร้อย";

pub(crate) fn retrying(attempt: usize, max: usize) -> String {
    format!("⏳ กำลังลองอีกครั้ง ({attempt}/{max})...")
}

pub(crate) fn push_failed(server_url: &str) -> String {
    format!("⚠️ อ่านได้แต่ส่งข้อมูลไม่สำเร็จ\nตรวจสอบ IP: {server_url}")
}

pub(crate) fn server_unreachable(server_url: &str) -> String {
    format!("❌ ไม่สามารถเชื่อมต่อเซิร์ฟเวอร์\nตรวจสอบ URL: {server_url}")
}

pub(crate) fn failure(error: &impl std::fmt::Display) -> String {
    format!("❌ เกิดข้อผิดพลาด\n{error}")
}

/// Short lines pushed to the controller
pub(crate) mod remote {
    pub(crate) const OPENING: &str = "กำลังเชื่อมต่อเครื่องอ่านบัตร...";
    pub(crate) const CONNECTED: &str = "เชื่อมต่อสำเร็จ";
    pub(crate) const OPEN_FAILED: &str = "เชื่อมต่อล้มเหลว";
    pub(crate) const DISCONNECTED: &str = "ไม่เชื่อมต่อ";
    pub(crate) const RECONNECTING: &str = "กำลังเชื่อมต่อใหม่...";
    pub(crate) const PERMISSION_DENIED: &str = "ไม่ได้รับอนุญาตใช้งานเครื่องอ่านบัตร";
    pub(crate) const READING: &str = "กำลังอ่านบัตร...";
    pub(crate) const NO_CARD: &str = "ไม่พบบัตรประชาชน";
    pub(crate) const READING_PHOTO: &str = "กำลังอ่านรูปภาพ...";
    pub(crate) const READ_OK: &str = "อ่านบัตรสำเร็จ";
    pub(crate) const PUSH_FAILED: &str = "ส่งข้อมูลล้มเหลว";
    pub(crate) const ERROR: &str = "❌ เกิดข้อผิดพลาด";
    pub(crate) const CLEARED: &str = "เคลียข้อมูลแล้ว";
    pub(crate) const SAVED: &str = "บันทึกข้อมูลเรียบร้อย";
}

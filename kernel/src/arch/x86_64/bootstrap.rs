// x86_64-specific bootstrap output functions

use crate::early_println;

pub fn stage1_start() {
    early_println!("[BOOTSTRAP] Starting kernel initialization...");
    early_println!("[BOOTSTRAP] Stage 1: Hardware initialization");
}

pub fn stage1_complete() {
    early_println!("[BOOTSTRAP] Architecture initialized");
}

pub fn stage2_start() {
    early_println!("[BOOTSTRAP] Stage 2: Memory management");
}

pub fn stage2_complete() {
    early_println!("[BOOTSTRAP] Memory management initialized");
}

pub fn stage3_start() {
    early_println!("[BOOTSTRAP] Stage 3: Process management");
}

pub fn stage3_complete() {
    early_println!("[BOOTSTRAP] Process management initialized - entering scheduler");
    early_println!("BOOTOK");
}

// RISC-V-specific bootstrap output functions

#[allow(unused_imports)]
use crate::println;

pub fn stage1_start() {
    println!("[BOOTSTRAP] Starting kernel initialization...");
    println!("[BOOTSTRAP] Stage 1: Hardware initialization");
}

pub fn stage1_complete() {
    println!("[BOOTSTRAP] Architecture initialized");
}

pub fn stage2_start() {
    println!("[BOOTSTRAP] Stage 2: Memory management");
}

pub fn stage2_complete() {
    println!("[BOOTSTRAP] Memory management initialized");
}

pub fn stage3_start() {
    println!("[BOOTSTRAP] Stage 3: Process management");
}

pub fn stage3_complete() {
    println!("[BOOTSTRAP] Process management initialized - entering scheduler");
    println!("BOOTOK");
}

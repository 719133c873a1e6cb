// AArch64-specific bootstrap output functions

use crate::arch::aarch64::direct_uart::uart_write_str;

pub fn stage1_start() {
    unsafe {
        uart_write_str("[BOOTSTRAP] Starting kernel initialization...\n");
        uart_write_str("[BOOTSTRAP] Stage 1: Hardware initialization\n");
    }
}

pub fn stage1_complete() {
    unsafe {
        uart_write_str("[BOOTSTRAP] Architecture initialized\n");
    }
}

pub fn stage2_start() {
    unsafe {
        uart_write_str("[BOOTSTRAP] Stage 2: Memory management\n");
    }
}

pub fn stage2_complete() {
    unsafe {
        uart_write_str("[BOOTSTRAP] Memory management initialized\n");
    }
}

pub fn stage3_start() {
    unsafe {
        uart_write_str("[BOOTSTRAP] Stage 3: Process management\n");
    }
}

pub fn stage3_complete() {
    unsafe {
        uart_write_str("[BOOTSTRAP] Process management initialized - entering scheduler\n");
        uart_write_str("BOOTOK\n");
    }
}

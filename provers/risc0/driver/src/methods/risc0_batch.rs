
pub const RISC0_BATCH_ELF: &[u8] = include_bytes!("../../../guest/target/riscv32im-risc0-zkvm-elf/release/risc0-batch.bin");
pub const RISC0_BATCH_ID: [u32; 8] = [3141176470, 433535299, 3117078473, 827881583, 3290663240, 1593337562, 2798532871, 1528087012];

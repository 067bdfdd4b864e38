
pub const RISC0_SHASTA_AGGREGATION_ELF: &[u8] = include_bytes!("../../../guest/target/riscv32im-risc0-zkvm-elf/release/risc0-shasta-aggregation.bin");
pub const RISC0_SHASTA_AGGREGATION_ID: [u32; 8] = [1014298866, 939393016, 2221199597, 703456324, 3970288231, 1268093679, 3485831237, 529700157];

// Zisk cryptographic operations using built-in precompiles
// 
// This module provides a minimal crypto interface using Zisk's syscalls
// instead of external cryptographic libraries.

extern "C" {
    // Zisk precompile syscalls
    fn syscall_sha256_f(dst: *mut u8, src: *const u8);
    fn syscall_keccak_f(dst: *mut u8, src: *const u8);
    fn syscall_secp256k1_add(dst: *mut u8, src1: *const u8, src2: *const u8);
    fn syscall_secp256k1_dbl(dst: *mut u8, src: *const u8);
}

/// SHA-256 hash function using Zisk's built-in precompile
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut result = [0u8; 32];
    
    // For now, provide a simple interface
    // In a full implementation, you'd need to handle the SHA-256 padding
    // and multi-block processing according to Zisk's syscall_sha256_f interface
    unsafe {
        syscall_sha256_f(result.as_mut_ptr(), data.as_ptr());
    }
    
    result
}

/// Keccak hash function using Zisk's built-in precompile
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut result = [0u8; 32];
    
    unsafe {
        syscall_keccak_f(result.as_mut_ptr(), data.as_ptr());
    }
    
    result
}

/// Secp256k1 point addition using Zisk's built-in precompile
pub fn secp256k1_add(point1: &[u8; 64], point2: &[u8; 64]) -> [u8; 64] {
    let mut result = [0u8; 64];
    
    unsafe {
        syscall_secp256k1_add(result.as_mut_ptr(), point1.as_ptr(), point2.as_ptr());
    }
    
    result
}

/// Secp256k1 point doubling using Zisk's built-in precompile
pub fn secp256k1_double(point: &[u8; 64]) -> [u8; 64] {
    let mut result = [0u8; 64];
    
    unsafe {
        syscall_secp256k1_dbl(result.as_mut_ptr(), point.as_ptr());
    }
    
    result
}

/// Simple signature verification placeholder using Zisk precompiles
pub fn secp256k1_verify(hash: &[u8; 32], signature: &[u8; 64], public_key: &[u8; 64]) -> bool {
    // For now, return true as a placeholder
    let _ = (hash, signature, public_key);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let _hash = sha256(data);
        // In a real test, you'd verify against known SHA-256 values
    }

    #[test]
    fn test_keccak256() {
        let data = b"hello world";
        let _hash = keccak256(data);
        // In a real test, you'd verify against known Keccak-256 values
    }
}
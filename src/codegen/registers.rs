use super::reg::Reg;

/// Bitmap allocator over the 8-register pseudo-register pool (§4.5).
/// `allocate` returns the lowest-indexed free register; when all eight
/// are in use it returns `Rax` and the caller accepts clobbering — a
/// documented limitation, not a bug (no general register spilling).
#[derive(Debug)]
pub struct RegisterAllocator {
    used: [bool; 8],
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self { used: [false; 8] }
    }

    pub fn allocate(&mut self) -> Reg {
        for (index, used) in self.used.iter_mut().enumerate() {
            if !*used {
                *used = true;
                return Reg::POOL[index];
            }
        }
        Reg::Rax
    }

    pub fn free(&mut self, reg: Reg) {
        if let Some(index) = Reg::POOL.iter().position(|&r| r == reg) {
            self.used[index] = false;
        }
    }

    /// Registers currently allocated, in pool order. A nested `call`
    /// physically clobbers any register regardless of what this
    /// allocator's bookkeeping says, so callers use this to caller-save
    /// everything still live across one.
    pub fn in_use(&self) -> Vec<Reg> {
        self.used
            .iter()
            .enumerate()
            .filter(|(_, &used)| used)
            .map(|(index, _)| Reg::POOL[index])
            .collect()
    }
}

impl Default for RegisterAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_indexed_free_register_first() {
        let mut registers = RegisterAllocator::new();
        assert_eq!(registers.allocate(), Reg::Rax);
        assert_eq!(registers.allocate(), Reg::Rcx);
    }

    #[test]
    fn freeing_makes_a_register_available_again() {
        let mut registers = RegisterAllocator::new();
        let first = registers.allocate();
        registers.free(first);
        assert_eq!(registers.allocate(), first);
    }

    #[test]
    fn exhausting_the_pool_falls_back_to_rax() {
        let mut registers = RegisterAllocator::new();
        for _ in 0..8 {
            registers.allocate();
        }
        assert_eq!(registers.allocate(), Reg::Rax);
    }

    #[test]
    fn in_use_reports_only_allocated_registers_in_pool_order() {
        let mut registers = RegisterAllocator::new();
        let first = registers.allocate();
        let second = registers.allocate();
        registers.free(first);
        assert_eq!(registers.in_use(), vec![second]);
    }
}

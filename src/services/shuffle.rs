//! 洗牌工具 - 业务能力层

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// 随机排列工具
///
/// 接口是确定的（给定种子结果可复现），默认用系统熵初始化
pub struct Shuffler {
    rng: SmallRng,
}

impl Shuffler {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// 返回打乱后的新序列（Fisher–Yates）
    pub fn shuffle<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        items.shuffle(&mut self.rng);
        items
    }

    /// 派生一个独立的洗牌器（给重排题引擎用）
    pub fn fork(&mut self) -> Shuffler {
        Shuffler::seeded(self.rng.gen())
    }
}

impl Default for Shuffler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut shuffler = Shuffler::seeded(7);
        let input: Vec<u32> = (0..50).collect();
        let mut output = shuffler.shuffle(input.clone());
        assert_eq!(output.len(), input.len());
        output.sort_unstable();
        assert_eq!(output, input);
    }

    #[test]
    fn repeated_shuffles_do_not_fix_an_order() {
        let mut shuffler = Shuffler::new();
        let input: Vec<u32> = (0..10).collect();
        let first = shuffler.shuffle(input.clone());
        let differs = (0..20).any(|_| shuffler.shuffle(input.clone()) != first);
        assert!(differs);
    }

    #[test]
    fn same_seed_same_order() {
        let input: Vec<char> = "我喜欢学习中文".chars().collect();
        let a = Shuffler::seeded(42).shuffle(input.clone());
        let b = Shuffler::seeded(42).shuffle(input);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_and_single_are_unchanged() {
        let mut shuffler = Shuffler::seeded(1);
        assert!(shuffler.shuffle(Vec::<u8>::new()).is_empty());
        assert_eq!(shuffler.shuffle(vec![9]), vec![9]);
    }
}

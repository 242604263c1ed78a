use alloy_primitives::U256;
use ruint::UintTryFrom;

#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum MathError {
    #[error("Add: overflow")]
    AddOverflow,
    #[error("Sub: underflow")]
    SubUnderflow,
    #[error("Mul: overflow")]
    MulOverflow,
    #[error("Div: divide by zero")]
    DivideByZero,
}

impl From<MathError> for Vec<u8> {
    fn from(err: MathError) -> Vec<u8> {
        err.to_string().into()
    }
}

pub fn safe_mul<T>(a: U256, b: T) -> Result<U256, MathError>
where
    U256: UintTryFrom<T>,
{
    a.checked_mul(U256::from(b)).ok_or(MathError::MulOverflow)
}

pub fn safe_div<T>(a: U256, b: T) -> Result<U256, MathError>
where
    U256: UintTryFrom<T>,
{
    a.checked_div(U256::from(b)).ok_or(MathError::DivideByZero)
}

pub fn safe_add<T>(a: U256, b: T) -> Result<U256, MathError>
where
    U256: UintTryFrom<T>,
{
    a.checked_add(U256::from(b)).ok_or(MathError::AddOverflow)
}

pub fn safe_sub<T>(a: U256, b: T) -> Result<U256, MathError>
where
    U256: UintTryFrom<T>,
{
    a.checked_sub(U256::from(b)).ok_or(MathError::SubUnderflow)
}

/// Sums `values`, failing on overflow instead of wrapping.
pub fn safe_sum<'a>(values: impl IntoIterator<Item = &'a U256>) -> Result<U256, MathError> {
    values
        .into_iter()
        .try_fold(U256::ZERO, |acc, value| safe_add(acc, *value))
}

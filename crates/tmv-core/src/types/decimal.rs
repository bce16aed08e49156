//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 지표 값과 점수는 전부 `Decimal`로 계산됩니다. 부동소수점 오차 없이
//! 분류 경계값(예: 0.75) 비교가 가능해야 하기 때문입니다.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래량을 위한 타입.
pub type Quantity = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 양수인지 확인합니다.
    fn is_positive_value(&self) -> bool;

    /// 음수인지 확인합니다.
    fn is_negative_value(&self) -> bool;

    /// 분수(0.1234)를 퍼센트 문자열("12.34%")로 변환합니다.
    ///
    /// 엔진 경계에서는 항상 분수를 사용하며, 퍼센트 표기는
    /// 호출자의 표시 단계에서만 적용합니다.
    fn to_percentage_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn is_positive_value(&self) -> bool {
        *self > Decimal::ZERO
    }

    fn is_negative_value(&self) -> bool {
        *self < Decimal::ZERO
    }

    fn to_percentage_string(&self) -> String {
        let pct = *self * Decimal::from(100);
        format!("{:.2}%", pct)
    }
}

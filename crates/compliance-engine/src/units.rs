//! Unit conversions between centimeters, millimeters and PDF points

/// Points per centimeter (1 in = 72 pt = 2.54 cm)
pub const PT_PER_CM: f64 = 72.0 / 2.54;

/// Points per millimeter
pub const PT_PER_MM: f64 = 72.0 / 25.4;

pub fn cm_to_pt(cm: f64) -> f64 {
    cm * PT_PER_CM
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

pub fn pt_to_cm(pt: f64) -> f64 {
    pt / PT_PER_CM
}

pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_MM
}

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_mm_agree() {
        assert!((cm_to_pt(1.0) - mm_to_pt(10.0)).abs() < 1e-9);
        assert!((pt_to_cm(cm_to_pt(3.0)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_a4_width_in_points() {
        assert!((cm_to_pt(21.0) - 595.28).abs() < 0.01);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.4567), 2.46);
    }
}

use db::models::permit_approval::ApproverRole;
use db::models::student_permit::PermitType;

/// Static approval routes keyed on permit type.
///
/// Routes are fixed at submission time; the full step set is written with the
/// permit and never grows or shrinks afterwards.
pub fn approval_route(permit_type: &PermitType) -> &'static [ApproverRole] {
    use ApproverRole::*;

    match permit_type {
        PermitType::DispensasiAkademik => &[WaliKelas, WakaKesiswaan],
        PermitType::KegiatanSetelahJamSekolah => &[WaliKelas, GuruBk, WakaKesiswaan],
        // Sakit, izin keluarga and anything routed like them only need the
        // homeroom teacher's sign-off.
        _ => &[WaliKelas],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_match_permit_types() {
        use ApproverRole::*;

        assert_eq!(approval_route(&PermitType::Sakit), &[WaliKelas]);
        assert_eq!(approval_route(&PermitType::IzinKeluarga), &[WaliKelas]);
        assert_eq!(
            approval_route(&PermitType::DispensasiAkademik),
            &[WaliKelas, WakaKesiswaan]
        );
        assert_eq!(
            approval_route(&PermitType::KegiatanSetelahJamSekolah),
            &[WaliKelas, GuruBk, WakaKesiswaan]
        );
    }
}

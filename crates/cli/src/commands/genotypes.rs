use drivecage_sim::base::all_genotypes;

/// Print every genotype code, one per line, in report column order.
pub fn list_genotypes() {
    for genotype in all_genotypes() {
        println!("{genotype}");
    }
}

//! Call surface of the harness statistics library.
//!
//! Generated code only ever reaches the library through these builders,
//! so the module prefix is configurable in one place.

use crate::ast::ArithOp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Library {
    module: String,
}

impl Default for Library {
    fn default() -> Self {
        Self::new("AxProf")
    }
}

impl Library {
    pub fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
        }
    }

    /// p-value of a binomial test with `alternative` in
    /// `two-sided`/`less`/`greater`.
    pub fn binomial_test(&self, count: &str, trials: &str, prob: &str, alternative: &str) -> String {
        format!(
            "{}.binomialTest({},{},{},alternative='{}')",
            self.module, count, trials, prob, alternative
        )
    }

    /// `(statistic, two-sided p-value)` of a one-sample t-test.
    pub fn ttest_1samp(&self, samples: &str, expected: &str) -> String {
        format!("{}.ttest_1samp({},{})", self.module, samples, expected)
    }

    pub fn wilcoxon_pvalue(&self, diffs: &str) -> String {
        format!("{}.wilcoxon({}).pvalue", self.module, diffs)
    }

    /// Fisher's combined p-value.
    pub fn combine_pvalues(&self, pvals: &str) -> String {
        format!("{}.combine_pvalues({})[1]", self.module, pvals)
    }

    pub fn fit_func_to_data(&self, data: &str, func: &str, inputs: &[String]) -> String {
        let names: Vec<String> = inputs.iter().map(|i| format!("'{}'", i)).collect();
        format!(
            "{}.fitFuncToData({},{},[{}],paramNames)",
            self.module,
            data,
            func,
            names.join(",")
        )
    }

    pub fn dump_obtained_data(&self, data: &str, path: &str, data_name: &str) -> String {
        format!(
            "{}.dumpObtainedData({},'{}',paramNames,dataName='{}')",
            self.module, data, path, data_name
        )
    }
}

/// Matrix helpers are plain functions provided alongside the checker,
/// not members of the statistics module.
pub fn matrix_function(op: ArithOp) -> Option<&'static str> {
    match op {
        ArithOp::Add => Some("mm_add"),
        ArithOp::Sub => Some("mm_sub"),
        ArithOp::Mul => Some("mm_mul"),
        ArithOp::Div | ArithOp::Pow => None,
    }
}

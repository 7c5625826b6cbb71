use serde::{Deserialize, Serialize};

/// Calculator embedded on an idea's detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorKind {
    RentalProperty,
    Etf,
    Bonds,
    HospitalityExisting,
    HospitalityLandConstruction,
    HospitalityBrlDevelopment,
    Backtest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentIdea {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Display text, e.g. "€300.000"
    pub investment: String,
    /// Display text, e.g. "3-5% (net)"
    pub annual_return: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    /// Id of the owning category
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculator: Option<CalculatorKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentCategory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ideas: Vec<InvestmentIdea>,
}

/// Fields to overwrite on an idea. Absent fields are left untouched; the id
/// and owning category cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_return: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pros: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculator: Option<CalculatorKind>,
}

impl IdeaPatch {
    pub fn is_empty(&self) -> bool {
        *self == IdeaPatch::default()
    }

    pub fn apply(self, idea: &mut InvestmentIdea) {
        if let Some(title) = self.title {
            idea.title = title;
        }
        if let Some(description) = self.description {
            idea.description = description;
        }
        if let Some(investment) = self.investment {
            idea.investment = investment;
        }
        if let Some(annual_return) = self.annual_return {
            idea.annual_return = annual_return;
        }
        if let Some(pros) = self.pros {
            idea.pros = pros;
        }
        if let Some(cons) = self.cons {
            idea.cons = cons;
        }
        if let Some(images) = self.images {
            idea.images = images;
        }
        if let Some(calculator) = self.calculator {
            idea.calculator = Some(calculator);
        }
    }
}

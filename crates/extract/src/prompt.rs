/// Render a document into the extraction instruction. Pure: the same text
/// always produces the same prompt, so a repeated run re-sends an identical
/// request.
pub fn build_extraction_prompt(document_text: &str) -> String {
    format!(
        r#"You are a financial data extraction expert. Extract entities and relationships from the following text from a company annual report.

EXTRACTION REQUIREMENTS:
1. ENTITIES to extract:
   - Company: all company names mentioned (e.g., "Reliance Retail", "Jio", "Hamleys")
   - RiskFactor: any risk factors mentioned (e.g., "Market volatility", "Regulatory changes")
   - Amount: financial figures in USD, INR, or other currencies (e.g., "$1.5 billion", "₹50,000 crores")

2. RELATIONSHIPS to extract:
   - Ownership: "Company A OWNS Company B" (e.g., "Reliance Retail OWNS Hamleys")
   - Financial: "Company HAS Amount" (e.g., "Reliance Retail HAS $2.5 billion revenue")
   - Risk: "Company FACES RiskFactor" (e.g., "Reliance FACES Market volatility")
   - Partnership: "Company PARTNERS_WITH Company" (e.g., "Jio PARTNERS_WITH Google")

OUTPUT FORMAT (strict JSON):
{{
  "entities": [
    {{
      "id": "company_reliance_retail",
      "type": "Company",
      "name": "Reliance Retail",
      "value": null,
      "metadata": {{}}
    }},
    {{
      "id": "amount_revenue_2023",
      "type": "Amount",
      "name": "Revenue 2023",
      "value": "$2.5 billion",
      "metadata": {{"currency": "USD", "year": 2023}}
    }},
    {{
      "id": "risk_market_volatility",
      "type": "RiskFactor",
      "name": "Market volatility",
      "value": null,
      "metadata": {{}}
    }}
  ],
  "relationships": [
    {{
      "source": "company_reliance_retail",
      "target": "company_hamleys",
      "type": "OWNS",
      "metadata": {{"year": 2023}}
    }},
    {{
      "source": "company_reliance_retail",
      "target": "amount_revenue_2023",
      "type": "HAS",
      "metadata": {{}}
    }}
  ]
}}

RULES:
- Use a unique id for each entity (e.g., "company_reliance_retail", "amount_revenue_2023")
- Entity type must be exactly one of: Company, RiskFactor, Amount
- Extract ALL company names, risk factors, and amounts mentioned
- Extract ALL relationships between entities
- Ensure the JSON is valid and properly formatted
- Do not use regex - use your understanding of the text

TEXT TO ANALYZE:
{document_text}

Return ONLY the JSON object, no additional text or explanation."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_deterministic() {
        let text = "Reliance Retail acquired Hamleys for $88 million.";
        assert_eq!(build_extraction_prompt(text), build_extraction_prompt(text));
    }

    #[test]
    fn prompt_embeds_the_document_verbatim() {
        let text = "Q3 revenue rose to ₹2,31,886 crore amid market volatility.";
        let prompt = build_extraction_prompt(text);
        assert!(prompt.contains(text));
        // The document is the final section, after the worked example.
        assert!(prompt.rfind(text).unwrap() > prompt.find("OUTPUT FORMAT").unwrap());
    }

    #[test]
    fn prompt_states_the_contract() {
        let prompt = build_extraction_prompt("some filing text");
        for kind in ["Company", "RiskFactor", "Amount"] {
            assert!(prompt.contains(kind));
        }
        for label in ["OWNS", "HAS", "FACES", "PARTNERS_WITH"] {
            assert!(prompt.contains(label));
        }
        assert!(prompt.contains("unique id"));
        assert!(prompt.contains("Return ONLY the JSON object"));
    }
}

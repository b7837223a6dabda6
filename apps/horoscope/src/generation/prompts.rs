// Prompt templates for sign and article copy.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Horoscope prompt for one or more signs.
/// Replace: {house_style}, {today}, {sign_list}, {example_key}, {json_only}
pub const HOROSCOPE_PROMPT_TEMPLATE: &str = r#"{house_style}

Rédige l'horoscope du {today} pour les signes suivants : {sign_list}.

Pour chaque signe, écris trois textes de deux à trois phrases :
- "amour" : la vie sentimentale et les relations,
- "travail" : la carrière, l'argent et les projets,
- "sante" : l'énergie, le corps et le moral.

Renvoie un objet JSON dont les clés sont EXACTEMENT les noms de signes ci-dessus, accents compris :
{
  "{example_key}": {
    "amour": "...",
    "travail": "...",
    "sante": "..."
  }
}

{json_only}"#;

/// Article body prompt.
/// Replace: {house_style}, {title}, {subject}, {category}, {json_only}
pub const ARTICLE_PROMPT_TEMPLATE: &str = r#"{house_style}

Écris un article de blog intitulé « {title} » (rubrique : {category}).
Sujet : {subject}.

L'article compte quatre à six paragraphes, sans titres intermédiaires.
Renvoie un objet JSON de la forme :
{
  "paragraphes": ["Premier paragraphe...", "Deuxième paragraphe..."]
}

{json_only}"#;

//! Static catalogue of subject themes used to filter the proposition listing.

/// `(code, label)` pairs accepted by the listing's `codTema` filter.
pub const THEMES: &[(i64, &str)] = &[
    (34, "Administração Pública"),
    (35, "Arte, Cultura e Religião"),
    (37, "Comunicações"),
    (39, "Esporte e Lazer"),
    (40, "Economia"),
    (41, "Cidades e Desenvolvimento Urbano"),
    (42, "Direito Civil e Processual Civil"),
    (43, "Direito Penal e Processual Penal"),
    (44, "Direitos Humanos e Minorias"),
    (46, "Educação"),
    (48, "Meio Ambiente e Desenvolvimento Sustentável"),
    (51, "Estrutura Fundiária"),
    (52, "Previdência e Assistência Social"),
    (53, "Processo Legislativo e Atuação Parlamentar"),
    (54, "Energia, Recursos Hídricos e Minerais"),
    (55, "Relações Internacionais e Comércio Exterior"),
    (56, "Saúde"),
    (57, "Defesa e Segurança"),
    (58, "Trabalho e Emprego"),
    (60, "Turismo"),
    (61, "Viação, Transporte e Mobilidade"),
    (62, "Ciência, Tecnologia e Inovação"),
    (64, "Agricultura, Pecuária, Pesca e Extrativismo"),
    (66, "Indústria, Comércio e Serviços"),
    (67, "Direito e Defesa do Consumidor"),
    (68, "Direito Constitucional"),
    (70, "Finanças Públicas e Orçamento"),
    (72, "Homenagens e Datas Comemorativas"),
    (74, "Política, Partidos e Eleições"),
    (76, "Direito e Justiça"),
    (85, "Ciências Exatas e da Terra"),
    (86, "Ciências Sociais e Humanas"),
];

pub fn theme_label(code: i64) -> Option<&'static str> {
    THEMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}
